//! Exit status codes for the CLI
//!
//! - 0: Success
//! - 1: Any error (network, timeouts, HTTP errors with --check-status)
//! - 130: The request was cancelled by Ctrl+C (standard SIGINT exit code)

use std::process::{ExitCode, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    Interrupted = 130,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Exit status for a completed response
    ///
    /// Only 2xx counts as success when `check_status` is set.
    pub fn from_http_status(status_code: u16, check_status: bool) -> Self {
        if !check_status || (200..300).contains(&status_code) {
            ExitStatus::Success
        } else {
            ExitStatus::Error
        }
    }
}
