//! Upload and download progress notification

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Direction of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Upload,
    Download,
}

/// One progress notification
#[derive(Debug, Clone)]
pub struct Progress {
    pub kind: ProgressKind,
    /// Bytes handled so far, cumulative
    pub processed: u64,
    /// Total bytes if the size is known up front
    pub expected: Option<u64>,
    /// The bytes that produced this event (download only)
    pub chunk: Option<Bytes>,
}

impl Progress {
    /// Fraction of the transfer completed, in `0.0..=1.0`
    ///
    /// Unknown totals report `0.0` until the transfer finishes.
    pub fn percent(&self) -> f64 {
        match self.expected {
            Some(0) => 1.0,
            Some(total) => (self.processed as f64 / total as f64).min(1.0),
            None => 0.0,
        }
    }
}

/// Sink for progress events, invoked from the exchange task
#[derive(Clone)]
pub struct ProgressHandler(Arc<dyn Fn(&Progress) + Send + Sync>);

impl ProgressHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        ProgressHandler(Arc::new(f))
    }

    pub fn notify(&self, progress: &Progress) {
        (self.0)(progress)
    }
}

impl fmt::Debug for ProgressHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgressHandler(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn event(processed: u64, expected: Option<u64>) -> Progress {
        Progress { kind: ProgressKind::Download, processed, expected, chunk: None }
    }

    #[test]
    fn test_percent() {
        assert_eq!(event(50, Some(200)).percent(), 0.25);
        assert_eq!(event(10, None).percent(), 0.0);
        assert_eq!(event(0, Some(0)).percent(), 1.0);
        assert_eq!(event(300, Some(200)).percent(), 1.0);
    }

    #[test]
    fn test_handler_notifies() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = ProgressHandler::new(move |p| sink.lock().unwrap().push(p.processed));
        handler.notify(&event(1, None));
        handler.clone().notify(&event(2, None));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
