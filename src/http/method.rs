//! HTTP method helpers

use reqwest::Method;

use crate::errors::Error;

/// The verbs with a dedicated façade entry point, in declaration order
pub const FACADE_METHODS: &[Method] = &[
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// Parse a method name, accepting any case for the standard verbs
///
/// Extension methods are kept as written since they are case-sensitive.
pub fn parse(method: &str) -> Result<Method, Error> {
    if let Some(standard) = FACADE_METHODS
        .iter()
        .chain([Method::TRACE, Method::CONNECT].iter())
        .find(|m| m.as_str().eq_ignore_ascii_case(method))
    {
        return Ok(standard.clone());
    }
    Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod(method.to_string()))
}

/// Check if a string looks like an HTTP method (all uppercase, reasonable length)
pub fn looks_like_method(s: &str) -> bool {
    if s.is_empty() || s.len() > 10 {
        return false;
    }

    if !s.chars().all(|c| c.is_ascii_uppercase()) {
        return false;
    }

    // Common uppercase hostnames
    !matches!(s, "LOCALHOST" | "HOST" | "SERVER")
}

/// Infer HTTP method based on whether the request has data
pub fn infer(has_data: bool) -> Method {
    if has_data {
        Method::POST
    } else {
        Method::GET
    }
}
