//! Request building module
//!
//! Converts per-call options into the `RequestDescription` consumed by a
//! transport.

mod builder;
mod multipart;
mod options;

pub use builder::{RequestBody, RequestDescription};
pub use multipart::build_multipart_form;
pub use options::{Credentials, HttpFile, RequestOptions};
