//! Transport capability
//!
//! A transport performs one exchange off the caller's thread and reports the
//! outcome through a single-shot [`Completion`]. The returned [`Exchange`]
//! is a back-reference the caller may use to request a best-effort abort;
//! the transport keeps ownership of the work itself.

mod worker;

use std::fmt;
use std::sync::Arc;

use crate::errors::Error;
use crate::request::RequestDescription;
use crate::response::HttpResult;

pub use worker::ReqwestTransport;

/// What a transport reports when an exchange ends
#[derive(Debug)]
pub enum Delivery {
    Completed(HttpResult),
    Failed(Error),
    /// The exchange ended without a result and without a failure
    Aborted,
}

/// Single-shot completion callback handed to [`Transport::start`]
///
/// `complete` consumes the completion, so it can run at most once. Dropping
/// it without completing reports `Delivery::Failed(Error::Abandoned)`, which
/// keeps a misbehaving transport from leaving its caller suspended forever.
pub struct Completion {
    deliver: Option<Box<dyn FnOnce(Delivery) + Send>>,
}

impl Completion {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Delivery) + Send + 'static,
    {
        Self { deliver: Some(Box::new(f)) }
    }

    pub fn complete(mut self, delivery: Delivery) {
        if let Some(deliver) = self.deliver.take() {
            deliver(delivery);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(deliver) = self.deliver.take() {
            deliver(Delivery::Failed(Error::Abandoned));
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.deliver.is_some())
            .finish()
    }
}

/// Handle to an in-flight exchange
///
/// `cancel` must be safe to call at any time, any number of times, including
/// after the exchange has delivered or while it is delivering; in those
/// cases it is a no-op.
pub trait Exchange: Send + Sync {
    fn cancel(&self);
}

/// Performs HTTP exchanges
pub trait Transport: Send + Sync {
    /// Start an exchange in the background and return immediately
    ///
    /// `on_complete` is invoked at most once. A transport may skip it when the
    /// exchange is cancelled before its outcome is observed.
    fn start(&self, request: RequestDescription, on_complete: Completion) -> Arc<dyn Exchange>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn start(&self, request: RequestDescription, on_complete: Completion) -> Arc<dyn Exchange> {
        (**self).start(request, on_complete)
    }
}
