//! Cancellable async client
//!
//! Every verb helper forwards to [`Client::request`] with the method fixed;
//! options, including the progress sink and timeout, pass through untouched.

use reqwest::Method;
use std::fmt;
use std::sync::Arc;

use super::blocking;
use crate::bridge::Job;
use crate::config::ClientConfig;
use crate::errors::Result;
use crate::request::{RequestDescription, RequestOptions};
use crate::transport::{Completion, Delivery, Exchange, ReqwestTransport, Transport};

/// HTTP client whose requests are cancellable futures
///
/// Cloning is cheap; clones share the transport.
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
        f.debug_struct("Client").finish_non_exhaustive()
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
        Self { transport: Arc::new(transport) }
    }

    /// A blocking client sharing this client's transport
    pub fn blocking(&self) -> blocking::Client {
        blocking::Client::from_shared(self.transport.clone())
    }

    /// Issue a request
    ///
    /// Nothing is sent until the returned [`Job`] is first polled. A URL or
    /// header that cannot be used surfaces as the job's error.
    pub fn request(&self, method: Method, url: impl AsRef<str>, options: RequestOptions) -> Job {
        Job::new(
            self.transport.clone(),
            RequestDescription::new(method, url.as_ref(), options),
        )
    }

    /// Issue a request and report through a callback instead of a future
    ///
    /// `on_complete` runs on a transport-owned thread, at most once. The
    /// returned exchange can be cancelled; a cancelled exchange may report
    /// `Delivery::Aborted` or nothing at all.
    pub fn start<F>(&self, method: Method, url: impl AsRef<str>, options: RequestOptions, on_complete: F) -> Result<Arc<dyn Exchange>>
    where
        F: FnOnce(Delivery) + Send + 'static,
    {
        let request = RequestDescription::new(method, url.as_ref(), options)?;
        Ok(self.transport.start(request, Completion::new(on_complete)))
    }

    pub fn get(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::GET, url, options)
    }

    pub fn post(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::POST, url, options)
    }

    pub fn put(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::PUT, url, options)
    }

    pub fn patch(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::PATCH, url, options)
    }

    pub fn delete(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::DELETE, url, options)
    }

    pub fn head(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::HEAD, url, options)
    }

    pub fn options(&self, url: impl AsRef<str>, options: RequestOptions) -> Job {
        self.request(Method::OPTIONS, url, options)
    }
}
