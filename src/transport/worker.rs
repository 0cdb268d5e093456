//! Transport built on async `reqwest`, driven by a background runtime

use bytes::Bytes;
use futures::StreamExt;
use once_cell::sync::{Lazy, OnceCell};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{Completion, Delivery, Exchange, Transport};
use crate::config::ClientConfig;
use crate::errors::Error;
use crate::progress::{Progress, ProgressHandler, ProgressKind};
use crate::request::{build_multipart_form, RequestBody, RequestDescription};
use crate::response::HttpResult;

const THREAD_NAME: &str = "justhttp-exchange";
const WORKER_THREADS: usize = 2;

/// Runtime shared by every transport; never dropped, so pooled connections
/// always outlive the exchanges that use them.
static RUNTIME: Lazy<Result<Runtime, String>> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .thread_name(THREAD_NAME)
        .enable_all()
        .build()
        .map_err(|e| e.to_string())
});

/// Runs each exchange as a task on a background tokio runtime
///
/// Cancelling an exchange drops its in-flight future, which closes the
/// connection. The reqwest clients are built once per transport, one per
/// redirect policy; timeouts are applied per request.
#[derive(Clone)]
pub struct ReqwestTransport {
    shared: Arc<Shared>,
}

struct Shared {
    config: ClientConfig,
    clients: OnceCell<Clients>,
}

struct Clients {
    follow: Client,
    no_follow: Client,
}

impl Shared {
    fn client(&self, allow_redirects: bool) -> Result<Client, Error> {
        let clients = self.clients.get_or_try_init(|| {
            Ok::<_, Error>(Clients {
                follow: build_client(&self.config, true)?,
                no_follow: build_client(&self.config, false)?,
            })
        })?;
        Ok(if allow_redirects {
            clients.follow.clone()
        } else {
            clients.no_follow.clone()
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.shared.config)
            .field("clients_built", &self.shared.clients.get().is_some())
            .finish()
    }
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                clients: OnceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }
}

/// Abort handle for one exchange task
#[derive(Debug, Default)]
struct WorkerExchange {
    token: CancellationToken,
}

impl Exchange for WorkerExchange {
    fn cancel(&self) {
        if !self.token.is_cancelled() {
            debug!("exchange cancel requested");
            self.token.cancel();
        }
    }
}

impl Transport for ReqwestTransport {
    fn start(&self, request: RequestDescription, on_complete: Completion) -> Arc<dyn Exchange> {
        let exchange = Arc::new(WorkerExchange::default());

        match RUNTIME.as_ref() {
            Ok(runtime) => {
                let shared = self.shared.clone();
                let token = exchange.token.clone();
                runtime.spawn(run_exchange(shared, request, on_complete, token));
            }
            Err(e) => {
                warn!(error = %e, "could not start exchange runtime");
                on_complete.complete(Delivery::Failed(Error::Worker(e.clone())));
            }
        }

        exchange
    }
}

async fn run_exchange(shared: Arc<Shared>, request: RequestDescription, on_complete: Completion, token: CancellationToken) {
    let method = request.method().clone();
    let url = request.url().clone();
    debug!(method = %method, url = %url, "exchange started");

    let outcome = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        result = perform(&shared, request) => Some(result),
    };

    match outcome {
        None => {
            debug!(method = %method, url = %url, "exchange cancelled, connection dropped");
            on_complete.complete(Delivery::Aborted);
        }
        Some(Ok(result)) => {
            debug!(
                method = %method,
                url = %url,
                status = result.status_code(),
                bytes = result.content().len(),
                "exchange finished"
            );
            on_complete.complete(Delivery::Completed(result));
        }
        Some(Err(e)) => {
            debug!(method = %method, url = %url, error = %e, "exchange failed");
            on_complete.complete(Delivery::Failed(e));
        }
    }
}

/// Execute one request and read the whole body
async fn perform(shared: &Shared, request: RequestDescription) -> Result<HttpResult, Error> {
    let config = &shared.config;
    config.validate()?;

    let timeout = request.timeout().or(config.timeout);
    let timeout_secs = timeout.map(|t| t.as_secs_f64());
    let client = shared.client(request.allow_redirects())?;
    let progress = request.progress().cloned();

    let (body, request) = request.into_body();
    let mut builder = client
        .request(request.method().clone(), request.url().clone())
        .headers(request.headers().clone());

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(credentials) = request.auth() {
        builder = builder.basic_auth(&credentials.username, credentials.password.as_ref());
    }

    let builder = attach_body(builder, body, request.headers(), config.chunk_size, progress.clone()).await?;

    let mut response = builder
        .send()
        .await
        .map_err(|e| Error::from_transport(e, timeout_secs))?;

    let status = response.status();
    let headers = response.headers().clone();
    let final_url = response.url().clone();
    let expected = response.content_length();

    let mut content = Vec::with_capacity(expected.unwrap_or(0).min(config.chunk_size as u64 * 64) as usize);
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::from_transport(e, timeout_secs))?
    {
        match &progress {
            Some(progress) => {
                for piece in split(chunk, config.chunk_size) {
                    content.extend_from_slice(&piece);
                    notify_download(progress, content.len() as u64, expected, piece);
                }
            }
            None => content.extend_from_slice(&chunk),
        }
    }

    Ok(HttpResult::new(
        status,
        headers,
        Bytes::from(content),
        final_url,
        request.method().clone(),
    ))
}

/// Split into pieces of at most `size` bytes without copying
fn split(data: Bytes, size: usize) -> Vec<Bytes> {
    (0..data.len())
        .step_by(size)
        .map(|start| data.slice(start..(start + size).min(data.len())))
        .collect()
}

fn notify_download(progress: &ProgressHandler, processed: u64, expected: Option<u64>, chunk: Bytes) {
    trace!(processed, expected, "download progress");
    progress.notify(&Progress {
        kind: ProgressKind::Download,
        processed,
        expected,
        chunk: Some(chunk),
    });
}

/// Attach the body to the request
async fn attach_body(
    builder: RequestBuilder,
    body: RequestBody,
    headers: &HeaderMap,
    chunk_size: usize,
    progress: Option<ProgressHandler>,
) -> Result<RequestBuilder, Error> {
    let with_type = |builder: RequestBuilder, content_type: &'static str| {
        if headers.contains_key(CONTENT_TYPE) {
            builder
        } else {
            builder.header(CONTENT_TYPE, content_type)
        }
    };

    Ok(match body {
        RequestBody::Empty => builder,
        RequestBody::Raw(bytes) => upload_body(builder, bytes, chunk_size, progress),
        RequestBody::Json(value) => {
            let bytes = serde_json::to_vec(&value)?;
            upload_body(with_type(builder, "application/json"), bytes, chunk_size, progress)
        }
        RequestBody::Form(fields) => {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&fields)
                .finish();
            upload_body(
                with_type(builder, "application/x-www-form-urlencoded"),
                encoded.into_bytes(),
                chunk_size,
                progress,
            )
        }
        // Multipart bodies have no upfront length, so they report no upload progress.
        RequestBody::Multipart { fields, files } => builder.multipart(build_multipart_form(fields, files).await?),
    })
}

/// Send a known-length body, reporting upload progress per chunk
///
/// Each event fires as its chunk is handed to the connection.
fn upload_body(builder: RequestBuilder, data: Vec<u8>, chunk_size: usize, progress: Option<ProgressHandler>) -> RequestBuilder {
    let Some(progress) = progress else {
        return builder.body(data);
    };

    let total = data.len() as u64;
    let mut sent = 0u64;
    let stream = futures::stream::iter(split(Bytes::from(data), chunk_size)).map(move |piece| {
        sent += piece.len() as u64;
        trace!(sent, total, "upload progress");
        progress.notify(&Progress {
            kind: ProgressKind::Upload,
            processed: sent,
            expected: Some(total),
            chunk: None,
        });
        Ok::<Bytes, std::io::Error>(piece)
    });

    builder
        .header(CONTENT_LENGTH, total)
        .body(reqwest::Body::wrap_stream(stream))
}

fn build_client(config: &ClientConfig, allow_redirects: bool) -> Result<Client, Error> {
    let policy = if allow_redirects {
        Policy::limited(config.max_redirects)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(default_headers(config)?)
        .redirect(policy)
        .build()
        .map_err(Error::Request)
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::new();
    for (name, value) in &config.default_headers {
        let header_name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::InvalidHeader(format!("default '{}': {}", name, e)))?;
        let header_value = HeaderValue::try_from(value.as_str())
            .map_err(|e| Error::InvalidHeader(format!("default '{}' value: {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
