//! CLI execution: parse arguments, send one request, print the response

use clap::Parser;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{process_args, Args};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::errors::{Error, Result};
use crate::response::HttpResult;
use crate::signals;
use crate::status::ExitStatus;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "JUSTHTTP_LOG";

/// Main entry point for the CLI.
///
/// Handles argument parsing, logging and configuration, then drives the
/// request on a tokio runtime until it completes, fails or is interrupted.
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_logging(parsed.verbose);

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            ClientConfig::default()
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("justhttp: error: failed to create runtime: {}", e);
            return ExitStatus::Error;
        }
    };

    match runtime.block_on(program(parsed, config, signals::interrupt_token())) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("justhttp: error: {}", e);
            ExitStatus::Error
        }
    }
}

/// Send the request described by `args`; `token` cancels it
pub async fn program(args: Args, config: ClientConfig, token: CancellationToken) -> Result<ExitStatus> {
    let processed = process_args(&args)?;
    let client = Client::with_config(config);

    info!(method = %processed.method, url = %processed.url, "sending request");

    let outcome = client
        .request(processed.method, &processed.url, processed.options)
        .cancel_on(token)
        .await?;

    match outcome {
        Some(response) => {
            debug!(status = response.status_code(), bytes = response.content().len(), "response received");
            write_response(&mut io::stdout().lock(), &response, args.body_only)?;
            Ok(ExitStatus::from_http_status(response.status_code(), args.check_status))
        }
        None => {
            eprintln!("Cancelled");
            Ok(ExitStatus::Interrupted)
        }
    }
}

/// Install the fmt subscriber on stderr
///
/// `JUSTHTTP_LOG` wins over `--verbose`; without either only warnings show.
fn init_logging(verbose: bool) {
    let default = if verbose { "justhttp=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Print the status line, headers and body
pub fn write_response<W: Write>(out: &mut W, response: &HttpResult, body_only: bool) -> Result<()> {
    let result = (|| -> io::Result<()> {
        if !body_only {
            writeln!(out, "HTTP {} {}", response.status_code(), response.reason())?;
            for (name, value) in response.headers() {
                writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()))?;
            }
            writeln!(out)?;
        }
        let text = response.text();
        out.write_all(text.as_bytes())?;
        if !text.is_empty() && !text.ends_with('\n') {
            writeln!(out)?;
        }
        out.flush()
    })();

    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.map_err(Error::from),
    }
}
