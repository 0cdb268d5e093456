//! justhttp library interface
//!
//! A small HTTP client whose requests are cancellable futures. Each request
//! runs on a callback-style [`Transport`]; the [`Job`] bridge turns that
//! callback into a single awaitable outcome that resolves exactly once, to a
//! response, an error, or `None` when cancelled.
//!
//! # Module Organization
//!
//! - [`client`] - Async `Client` with per-verb helpers, plus a blocking variant
//! - [`bridge`] - `Job`, `Canceller` and the result handle behind them
//! - [`transport`] - The callback transport contract and the reqwest worker
//! - [`request`] / [`response`] - Request options and the `HttpResult` view
//! - [`errors`] - Error types (Error, Result)
//! - [`core`] - CLI execution logic

pub mod bridge;
pub mod cli;
pub mod client;
pub mod config;
pub mod cookies;
pub mod core;
pub mod errors;
pub mod http;
pub mod progress;
pub mod request;
pub mod response;
pub mod signals;
pub mod status;
pub mod transport;

pub use bridge::{Canceller, Job, Outcome};
pub use client::{blocking, Client};
pub use config::ClientConfig;
pub use errors::{Error, Result};
pub use progress::{Progress, ProgressKind};
pub use request::{HttpFile, RequestOptions};
pub use response::HttpResult;
pub use transport::{Completion, Delivery, Exchange, ReqwestTransport, Transport};
pub use tokio_util::sync::CancellationToken;
