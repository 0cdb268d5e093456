//! Common test utilities for justhttp integration tests
//!
//! This module provides shared test infrastructure including:
//! - A scripted transport whose exchanges finish after a fixed delay
//! - CLI invocation helpers
//! - Response fixtures
#![allow(dead_code)]

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

use justhttp::request::RequestDescription;
use justhttp::{Completion, Delivery, Error, Exchange, HttpResult, Transport};

/// One time unit for the timing scenarios
pub const UNIT: Duration = Duration::from_millis(100);

/// Slack allowed on top of the expected elapsed time
pub const SLACK: Duration = Duration::from_millis(80);

/// Build a 200 text/plain result for `request`
pub fn ok_result(request: &RequestDescription, body: &'static str) -> HttpResult {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    HttpResult::new(
        StatusCode::OK,
        headers,
        Bytes::from_static(body.as_bytes()),
        request.url().clone(),
        request.method().clone(),
    )
}

/// What a scripted exchange reports once its delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// A 200 response with body "done"
    Respond,
    /// A connection failure
    Fail,
    /// Drop the completion without calling it
    Abandon,
}

/// Flag behind each scripted exchange
#[derive(Debug, Default)]
pub struct ScriptedExchange {
    pub cancel_calls: AtomicUsize,
    cancelled: AtomicBool,
}

impl Exchange for ScriptedExchange {
    fn cancel(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Transport whose exchanges run on a thread, sleep, then report `script`
///
/// A cancelled exchange stops sleeping early and reports `Aborted`, like a
/// real transport would. `deliver_despite_cancel` makes it report its
/// scripted outcome anyway, to exercise late deliveries.
pub struct ScriptedTransport {
    pub delay: Duration,
    pub script: Script,
    pub deliver_despite_cancel: bool,
    pub started: AtomicUsize,
    pub exchanges: Mutex<Vec<Arc<ScriptedExchange>>>,
}

impl ScriptedTransport {
    pub fn new(delay: Duration, script: Script) -> Self {
        Self {
            delay,
            script,
            deliver_despite_cancel: false,
            started: AtomicUsize::new(0),
            exchanges: Mutex::new(Vec::new()),
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Total `cancel` calls across every exchange started so far
    pub fn cancel_calls(&self) -> usize {
        self.exchanges
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.cancel_calls.load(Ordering::SeqCst))
            .sum()
    }
}

impl Transport for ScriptedTransport {
    fn start(&self, request: RequestDescription, on_complete: Completion) -> Arc<dyn Exchange> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let exchange = Arc::new(ScriptedExchange::default());
        self.exchanges.lock().unwrap().push(exchange.clone());

        let worker = exchange.clone();
        let delay = self.delay;
        let script = self.script;
        let deliver_despite_cancel = self.deliver_despite_cancel;
        thread::spawn(move || {
            let step = Duration::from_millis(5);
            let mut waited = Duration::ZERO;
            while waited < delay {
                if worker.cancelled.load(Ordering::SeqCst) && !deliver_despite_cancel {
                    on_complete.complete(Delivery::Aborted);
                    return;
                }
                let nap = step.min(delay - waited);
                thread::sleep(nap);
                waited += nap;
            }
            match script {
                Script::Respond => on_complete.complete(Delivery::Completed(ok_result(&request, "done"))),
                Script::Fail => on_complete.complete(Delivery::Failed(Error::Connection("scripted failure".to_string()))),
                Script::Abandon => drop(on_complete),
            }
        });

        exchange
    }
}

/// Result of running the CLI binary
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CliResponse {
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Everything after the blank line that ends the headers
    pub fn body(&self) -> Option<&str> {
        self.stdout.find("\n\n").map(|pos| &self.stdout[pos + 2..])
    }
}

/// Run the CLI with an empty config directory and a short timeout
pub fn justhttp(args: &[&str]) -> CliResponse {
    let config_dir = TempDir::new().expect("Failed to create temp config dir");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_justhttp"));
    cmd.args(["--timeout", "2"]);
    cmd.args(args);
    cmd.env("JUSTHTTP_CONFIG", config_dir.path().join("config.toml"));
    cmd.env_remove("JUSTHTTP_AUTH");
    cmd.env_remove("JUSTHTTP_LOG");
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    parse_output(cmd.output().expect("Failed to execute command"))
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}
