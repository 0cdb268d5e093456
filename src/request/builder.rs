//! Request description builder
//!
//! Turns a method, a URL and `RequestOptions` into the immutable
//! `RequestDescription` a transport executes.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::Method;
use serde_json::Value as JsonValue;
use std::time::Duration;
use url::Url;

use super::options::{Credentials, HttpFile, RequestOptions};
use crate::errors::Error;
use crate::progress::ProgressHandler;

/// Request body variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Raw(Vec<u8>),
    Json(JsonValue),
    /// Form-urlencoded body
    Form(Vec<(String, String)>),
    /// Multipart form data: text fields followed by files
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<(String, HttpFile)>,
    },
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// A fully-built request, ready to hand to a transport
#[derive(Debug, Clone)]
pub struct RequestDescription {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
    auth: Option<Credentials>,
    allow_redirects: bool,
    timeout: Option<Duration>,
    progress: Option<ProgressHandler>,
}

impl RequestDescription {
    /// Build a description from per-call options
    pub fn new(method: Method, url: &str, options: RequestOptions) -> Result<Self, Error> {
        let url = build_url(url, &options.params, options.url_query.as_deref())?;
        let headers = build_headers(&options)?;

        let body = if let Some(raw) = options.body {
            RequestBody::Raw(raw)
        } else if let Some(json) = options.json {
            RequestBody::Json(json)
        } else if !options.files.is_empty() {
            RequestBody::Multipart { fields: options.data, files: options.files }
        } else if !options.data.is_empty() {
            RequestBody::Form(options.data)
        } else {
            RequestBody::Empty
        };

        Ok(Self {
            method,
            url,
            headers,
            body,
            auth: options.auth,
            allow_redirects: options.allow_redirects,
            timeout: options.timeout,
            progress: options.progress,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn auth(&self) -> Option<&Credentials> {
        self.auth.as_ref()
    }

    pub fn allow_redirects(&self) -> bool {
        self.allow_redirects
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn progress(&self) -> Option<&ProgressHandler> {
        self.progress.as_ref()
    }

    /// Split into the parts a transport consumes by value
    pub fn into_body(self) -> (RequestBody, Self) {
        let mut rest = self;
        let body = std::mem::replace(&mut rest.body, RequestBody::Empty);
        (body, rest)
    }
}

fn build_url(raw: &str, params: &[(String, String)], url_query: Option<&str>) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    if let Some(extra) = url_query.map(|q| q.trim_start_matches('?')).filter(|q| !q.is_empty()) {
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, extra),
            _ => extra.to_string(),
        };
        url.set_query(Some(&query));
    }

    Ok(url)
}

fn build_headers(options: &RequestOptions) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::new();
    for (name, value) in &options.headers {
        let header_name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::InvalidHeader(format!("'{}': {}", name, e)))?;
        let header_value = HeaderValue::try_from(value.as_str())
            .map_err(|e| Error::InvalidHeader(format!("'{}' value: {}", name, e)))?;
        map.insert(header_name, header_value);
    }

    if !options.cookies.is_empty() {
        let cookie = options
            .cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        let value = HeaderValue::try_from(cookie)
            .map_err(|e| Error::InvalidHeader(format!("cookie value: {}", e)))?;
        map.insert(COOKIE, value);
    }

    Ok(map)
}
