//! Ctrl+C handling
//!
//! The first interrupt cancels the in-flight request through a process-wide
//! token; a second one exits immediately.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

static INTERRUPT_TOKEN: Lazy<CancellationToken> = Lazy::new(CancellationToken::new);

/// Check if Ctrl+C was pressed
#[inline]
pub fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Record an interrupt and cancel everything waiting on the token
pub fn set_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
    INTERRUPT_TOKEN.cancel();
}

/// Token that fires on the first interrupt
pub fn interrupt_token() -> CancellationToken {
    INTERRUPT_TOKEN.clone()
}
