//! Post-parsing argument processing
//!
//! Resolves the method and URL from the positional arguments, then folds the
//! request items and flags into `RequestOptions`.

use reqwest::Method;
use std::time::Duration;
use url::Url;

use super::args::Args;
use super::items;
use crate::errors::{Error, Result};
use crate::http;
use crate::request::RequestOptions;

/// Everything needed to issue the request
#[derive(Debug)]
pub struct ProcessedArgs {
    pub method: Method,
    pub url: String,
    pub options: RequestOptions,
}

/// Check for an RFC 3986 scheme followed by "://"
fn has_url_scheme(s: &str) -> bool {
    match s.find("://") {
        Some(pos) => {
            let scheme = &s[..pos];
            scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme.chars().skip(1).all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

/// Split ":PORT/path" or ":/path" into (port, rest)
fn parse_localhost_shorthand(s: &str) -> Option<(&str, &str)> {
    if !s.starts_with(':') || s.starts_with("::") {
        return None;
    }
    let after_colon = &s[1..];
    let (port, rest) = match after_colon.find('/') {
        Some(slash) => (&after_colon[..slash], &after_colon[slash..]),
        None => (after_colon, ""),
    };
    port.chars().all(|c| c.is_ascii_digit()).then_some((port, rest))
}

/// Add a default scheme and expand the localhost shorthand
pub fn process_url(raw_url: &str) -> Result<String> {
    let mut url = raw_url.strip_prefix("://").unwrap_or(raw_url).to_string();

    if !has_url_scheme(&url) {
        if let Some((port, rest)) = parse_localhost_shorthand(&url) {
            url = if port.is_empty() {
                format!("localhost{}", rest)
            } else {
                format!("localhost:{}{}", port, rest)
            };
        }
        url = format!("http://{}", url);
    }

    Url::parse(&url).map_err(|e| Error::Argument(format!("Invalid URL '{}': {}", url, e)))?;
    Ok(url)
}

/// Turn parsed CLI arguments into a request
pub fn process_args(args: &Args) -> Result<ProcessedArgs> {
    let (explicit_method, raw_url, raw_items) = if http::looks_like_method(&args.method_or_url) {
        let (url, rest) = args
            .rest
            .split_first()
            .ok_or_else(|| Error::Argument("missing URL after method".to_string()))?;
        (Some(http::parse(&args.method_or_url)?), url.as_str(), rest)
    } else {
        (None, args.method_or_url.as_str(), args.rest.as_slice())
    };

    let url = process_url(raw_url)?;

    let parsed = raw_items.iter().map(|s| items::parse(s)).collect::<Result<Vec<_>>>()?;
    let mut options = items::apply(parsed, args.json, RequestOptions::new());

    if let Some(seconds) = args.timeout {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(Error::Argument(format!("timeout must be a positive number of seconds, got {}", seconds)));
        }
        options = options.timeout(Duration::from_secs_f64(seconds));
    }

    if args.no_follow {
        options = options.allow_redirects(false);
    }

    if let Some(auth) = &args.auth {
        options = match auth.as_str().split_once(':') {
            Some((user, password)) => options.basic_auth(user, password),
            None => options.basic_auth_user(auth.as_str()),
        };
    }

    let has_data = options.json.is_some() || !options.data.is_empty() || !options.files.is_empty();
    let method = explicit_method.unwrap_or_else(|| http::infer(has_data));

    Ok(ProcessedArgs { method, url, options })
}
