//! Cancellable job: a transport exchange seen as a single future

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::debug;

use super::handle::{Outcome, ResultHandle};
use crate::errors::{Error, Result};
use crate::request::RequestDescription;
use crate::transport::{Completion, Delivery, Transport};

enum Pending {
    Start {
        transport: Arc<dyn Transport>,
        request: RequestDescription,
    },
    Invalid(Error),
}

/// One in-flight request
///
/// The exchange starts on first poll and the job resolves exactly once:
/// `Ok(Some(result))` on completion, `Err(e)` on transport failure, or
/// `Ok(None)` when cancelled through a [`Canceller`], a cancellation token
/// registered with [`Job::cancel_on`], or by dropping the job.
#[must_use = "jobs do nothing unless awaited"]
pub struct Job {
    handle: Arc<ResultHandle>,
    resume: tokio::sync::oneshot::Receiver<Outcome>,
    pending: Option<Pending>,
    scope: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
}

impl Job {
    pub(crate) fn new(transport: Arc<dyn Transport>, request: Result<RequestDescription>) -> Self {
        let (handle, resume) = ResultHandle::new();
        let pending = match request {
            Ok(request) => Pending::Start { transport, request },
            Err(e) => Pending::Invalid(e),
        };
        Self {
            handle: Arc::new(handle),
            resume,
            pending: Some(pending),
            scope: None,
        }
    }

    /// A cloneable handle that cancels this job from anywhere
    pub fn canceller(&self) -> Canceller {
        Canceller { handle: self.handle.clone() }
    }

    /// Cancel the job; see [`Canceller::cancel`]
    pub fn cancel(&self) -> bool {
        self.handle.signal_cancel()
    }

    /// Cancel the job when `token` is cancelled
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.scope = Some(Box::pin(token.cancelled_owned()));
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    fn start(&mut self) {
        match self.pending.take() {
            Some(Pending::Start { transport, request }) => {
                if self.handle.is_cancelled() {
                    debug!(method = %request.method(), url = %request.url(), "job cancelled before start");
                    return;
                }
                debug!(method = %request.method(), url = %request.url(), "job started");
                let handle = self.handle.clone();
                let exchange = transport.start(request, Completion::new(move |delivery| handle.deliver(delivery)));
                self.handle.record(exchange);
            }
            Some(Pending::Invalid(e)) => self.handle.deliver(Delivery::Failed(e)),
            None => {}
        }
    }
}

impl Future for Job {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(scope) = this.scope.as_mut() {
            if scope.as_mut().poll(cx).is_ready() {
                this.scope = None;
                this.handle.signal_cancel();
            }
        }

        this.start();

        match Pin::new(&mut this.resume).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                // The handle keeps the sender until it sends.
                debug_assert!(false, "result handle dropped its resume sender");
                Poll::Ready(Err(Error::Abandoned))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        if self.pending.is_none() {
            self.handle.signal_cancel();
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("started", &self.pending.is_none())
            .field("cancelled", &self.handle.is_cancelled())
            .field("resolved", &self.handle.is_resolved())
            .finish()
    }
}

/// Cancels the job it was taken from
#[derive(Clone)]
pub struct Canceller {
    handle: Arc<ResultHandle>,
}

impl Canceller {
    /// Cancel the job if it has not resolved yet
    ///
    /// Returns true if this call cancelled it. Later calls, and calls after
    /// the job resolved, have no effect.
    pub fn cancel(&self) -> bool {
        self.handle.signal_cancel()
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }
}

impl std::fmt::Debug for Canceller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canceller")
            .field("cancelled", &self.handle.is_cancelled())
            .finish()
    }
}
