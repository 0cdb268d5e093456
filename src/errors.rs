//! Error types for justhttp
//!
//! Cancellation is deliberately absent from this enum: a cancelled request
//! resolves to `Ok(None)`, never to an error.

use thiserror::Error;

/// Main error type for justhttp
#[derive(Error, Debug)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Timeout after {0:.1} seconds")]
    Timeout(f64),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Could not start exchange worker: {0}")]
    Worker(String),

    #[error("Transport dropped the exchange without reporting an outcome")]
    Abandoned,

    #[error("Transport aborted the exchange")]
    Aborted,
}

impl Error {
    /// Classify a reqwest failure the way callers care about it
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Option<f64>) -> Self {
        if err.is_timeout() {
            return Error::Timeout(timeout.unwrap_or_default());
        }
        if err.is_connect() {
            return Error::Connection(err.to_string());
        }
        Error::Request(err)
    }

    /// True for failures raised by the network exchange itself
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Request(_)
                | Error::Io(_)
                | Error::Timeout(_)
                | Error::Connection(_)
                | Error::Worker(_)
                | Error::Abandoned
                | Error::Aborted
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
