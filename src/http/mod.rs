//! HTTP protocol helpers shared by the request builder and the CLI

mod method;

pub use method::*;
pub use reqwest::Method;
