//! HTTP client functionality

pub mod blocking;
pub mod http;

// Re-exports
pub use http::Client;
