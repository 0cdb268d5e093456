//! Blocking client
//!
//! Same transport as the async client; the calling thread waits on a channel
//! until the exchange reports. Calls cannot be cancelled by the caller, so
//! from async code run them under `tokio::task::spawn_blocking`.

use reqwest::Method;
use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::warn;

use crate::config::ClientConfig;
use crate::errors::{Error, Result};
use crate::request::{RequestDescription, RequestOptions};
use crate::response::HttpResult;
use crate::transport::{Completion, Delivery, ReqwestTransport, Transport};

/// HTTP client whose calls block until the response is read
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("blocking::Client").finish_non_exhaustive()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(ReqwestTransport::new(config))
    }

    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub(crate) fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue a request and wait for its result
    ///
    /// A transport that reports `Delivery::Aborted` yields `Error::Aborted`.
    pub fn request(&self, method: Method, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        let request = RequestDescription::new(method, url.as_ref(), options)?;
        let (tx, rx) = mpsc::channel();
        let _exchange = self.transport.start(
            request,
            Completion::new(move |delivery| {
                let _ = tx.send(delivery);
            }),
        );

        match rx.recv() {
            Ok(Delivery::Completed(result)) => Ok(result),
            Ok(Delivery::Failed(e)) => Err(e),
            Ok(Delivery::Aborted) => Err(Error::Aborted),
            Err(_) => {
                warn!("completion dropped without reporting");
                Err(Error::Abandoned)
            }
        }
    }

    pub fn get(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::GET, url, options)
    }

    pub fn post(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::POST, url, options)
    }

    pub fn put(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::PUT, url, options)
    }

    pub fn patch(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::PATCH, url, options)
    }

    pub fn delete(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::DELETE, url, options)
    }

    pub fn head(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::HEAD, url, options)
    }

    pub fn options(&self, url: impl AsRef<str>, options: RequestOptions) -> Result<HttpResult> {
        self.request(Method::OPTIONS, url, options)
    }
}
