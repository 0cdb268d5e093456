//! Per-attempt state shared by the exchange callback and the canceller

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::errors::Result;
use crate::response::HttpResult;
use crate::transport::{Delivery, Exchange};

/// The final outcome of one attempt: `Ok(None)` means cancelled
pub type Outcome = Result<Option<HttpResult>>;

struct HandleState {
    /// Back-reference used to forward an abort; cleared on resolution
    exchange: Option<Arc<dyn Exchange>>,
    recorded: bool,
    cancelled: bool,
    /// Present until the attempt resolves
    resume: Option<oneshot::Sender<Outcome>>,
}

/// Arbitrates between the transport's completion and the caller's cancel
///
/// Every transition happens under one mutex and the resume sender is taken
/// out of its slot before use, so the caller is resumed exactly once.
/// `Exchange::cancel` is always invoked after the lock is released.
pub struct ResultHandle {
    state: Mutex<HandleState>,
}

impl ResultHandle {
    pub fn new() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            state: Mutex::new(HandleState {
                exchange: None,
                recorded: false,
                cancelled: false,
                resume: Some(tx),
            }),
        };
        (handle, rx)
    }

    // No user code runs under the lock, so a poisoned state is still consistent.
    fn state(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register the in-flight exchange
    ///
    /// If cancellation already happened the exchange is aborted instead of
    /// stored. Only the first call has any effect.
    pub fn record(&self, exchange: Arc<dyn Exchange>) {
        let mut state = self.state();
        if state.recorded {
            return;
        }
        state.recorded = true;

        if state.cancelled {
            drop(state);
            debug!("exchange recorded after cancellation, aborting it");
            exchange.cancel();
        } else if state.resume.is_some() {
            state.exchange = Some(exchange);
        }
    }

    /// Request cancellation
    ///
    /// Resolves the caller with `Ok(None)` and aborts the recorded exchange.
    /// Returns false, doing nothing, if the attempt was already resolved or
    /// already cancelled.
    pub fn signal_cancel(&self) -> bool {
        let mut state = self.state();
        if state.cancelled {
            return false;
        }
        let Some(resume) = state.resume.take() else {
            trace!("cancel after resolution ignored");
            return false;
        };
        state.cancelled = true;
        let exchange = state.exchange.take();
        // The receiver may be gone if the job itself was dropped.
        let _ = resume.send(Ok(None));
        drop(state);

        debug!(in_flight = exchange.is_some(), "request cancelled");
        if let Some(exchange) = exchange {
            exchange.cancel();
        }
        true
    }

    /// Resolve the caller with what the transport reported
    ///
    /// Deliveries arriving after resolution are discarded.
    pub fn deliver(&self, delivery: Delivery) {
        let mut state = self.state();
        let Some(resume) = state.resume.take() else {
            if state.cancelled {
                debug!("delivery after cancellation discarded");
            }
            return;
        };
        state.exchange = None;

        let outcome = match delivery {
            Delivery::Completed(result) => Ok(Some(result)),
            Delivery::Failed(e) => Err(e),
            Delivery::Aborted => Ok(None),
        };
        let _ = resume.send(outcome);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }

    /// True once the caller has been (or is about to be) resumed
    pub fn is_resolved(&self) -> bool {
        self.state().resume.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use reqwest::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    #[derive(Default)]
    struct CountingExchange {
        cancels: AtomicUsize,
    }

    impl Exchange for CountingExchange {
        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingExchange {
        fn cancels(&self) -> usize {
            self.cancels.load(Ordering::SeqCst)
        }
    }

    fn completed(status: u16) -> Delivery {
        Delivery::Completed(HttpResult::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::new(),
            Url::parse("http://example.com").unwrap(),
            Method::GET,
        ))
    }

    #[test]
    fn test_delivery_resolves_with_result() {
        let (handle, mut rx) = ResultHandle::new();
        handle.deliver(completed(201));
        let outcome = rx.try_recv().unwrap();
        assert_eq!(outcome.unwrap().unwrap().status_code(), 201);
        assert!(handle.is_resolved());
    }

    #[test]
    fn test_failed_delivery_is_error() {
        let (handle, mut rx) = ResultHandle::new();
        handle.deliver(Delivery::Failed(Error::Timeout(1.0)));
        assert!(matches!(rx.try_recv().unwrap(), Err(Error::Timeout(_))));
    }

    #[test]
    fn test_aborted_delivery_is_empty() {
        let (handle, mut rx) = ResultHandle::new();
        handle.deliver(Delivery::Aborted);
        assert!(matches!(rx.try_recv().unwrap(), Ok(None)));
    }

    #[test]
    fn test_cancel_before_record_aborts_late_exchange() {
        let (handle, mut rx) = ResultHandle::new();
        assert!(handle.signal_cancel());
        assert!(matches!(rx.try_recv().unwrap(), Ok(None)));

        let exchange = Arc::new(CountingExchange::default());
        handle.record(exchange.clone());
        assert_eq!(exchange.cancels(), 1);
    }

    #[test]
    fn test_cancel_after_record_aborts_exchange() {
        let (handle, mut rx) = ResultHandle::new();
        let exchange = Arc::new(CountingExchange::default());
        handle.record(exchange.clone());
        assert_eq!(exchange.cancels(), 0);

        assert!(handle.signal_cancel());
        assert_eq!(exchange.cancels(), 1);
        assert!(matches!(rx.try_recv().unwrap(), Ok(None)));
    }

    #[test]
    fn test_cancel_after_delivery_is_noop() {
        let (handle, mut rx) = ResultHandle::new();
        let exchange = Arc::new(CountingExchange::default());
        handle.record(exchange.clone());
        handle.deliver(completed(200));

        assert!(!handle.signal_cancel());
        assert!(!handle.is_cancelled());
        assert_eq!(exchange.cancels(), 0);
        assert_eq!(rx.try_recv().unwrap().unwrap().unwrap().status_code(), 200);
    }

    #[test]
    fn test_delivery_after_cancel_discarded() {
        let (handle, mut rx) = ResultHandle::new();
        handle.signal_cancel();
        handle.deliver(completed(200));
        handle.deliver(Delivery::Failed(Error::Abandoned));
        assert!(matches!(rx.try_recv().unwrap(), Ok(None)));
    }

    #[test]
    fn test_cancel_twice_same_as_once() {
        let (handle, mut rx) = ResultHandle::new();
        let exchange = Arc::new(CountingExchange::default());
        handle.record(exchange.clone());
        assert!(handle.signal_cancel());
        assert!(!handle.signal_cancel());
        assert_eq!(exchange.cancels(), 1);
        assert!(matches!(rx.try_recv().unwrap(), Ok(None)));
    }

    #[test]
    fn test_second_record_is_noop() {
        let (handle, _rx) = ResultHandle::new();
        let first = Arc::new(CountingExchange::default());
        let second = Arc::new(CountingExchange::default());
        handle.record(first.clone());
        handle.record(second.clone());
        handle.signal_cancel();
        assert_eq!(first.cancels(), 1);
        assert_eq!(second.cancels(), 0);
    }

    #[test]
    fn test_second_delivery_is_noop() {
        let (handle, mut rx) = ResultHandle::new();
        handle.deliver(completed(200));
        handle.deliver(completed(500));
        assert_eq!(rx.try_recv().unwrap().unwrap().unwrap().status_code(), 200);
    }

    #[test]
    fn test_concurrent_cancel_and_delivery_resolve_once() {
        for _ in 0..200 {
            let (handle, mut rx) = ResultHandle::new();
            let handle = Arc::new(handle);
            let exchange = Arc::new(CountingExchange::default());
            handle.record(exchange.clone());

            let deliverer = {
                let handle = handle.clone();
                std::thread::spawn(move || handle.deliver(completed(200)))
            };
            let canceller = {
                let handle = handle.clone();
                std::thread::spawn(move || handle.signal_cancel())
            };
            deliverer.join().unwrap();
            let cancelled = canceller.join().unwrap();

            match rx.try_recv().unwrap() {
                Ok(None) => {
                    assert!(cancelled);
                    assert_eq!(exchange.cancels(), 1);
                }
                Ok(Some(result)) => {
                    assert!(!cancelled);
                    assert_eq!(result.status_code(), 200);
                    assert_eq!(exchange.cancels(), 0);
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
            assert!(rx.try_recv().is_err());
        }
    }
}
