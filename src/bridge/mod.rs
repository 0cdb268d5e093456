//! Suspension bridge
//!
//! Adapts the callback-based [`Transport`](crate::transport::Transport) to a
//! future that suspends once and resumes once, whichever of completion or
//! cancellation wins.

mod handle;
mod job;

pub use handle::Outcome;
pub use job::{Canceller, Job};
