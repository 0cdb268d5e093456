//! Response representation
//!
//! `HttpResult` is produced once per exchange and never mutated afterwards.
//! Text, JSON, cookie and link views are derived lazily on first access.

mod links;

use bytes::Bytes;
use cookie::Cookie;
use encoding_rs::{Encoding, UTF_8};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LINK, LOCATION, SET_COOKIE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;
use url::Url;

use crate::cookies::parse_set_cookie_headers;
use crate::errors::Error;

pub use links::{parse_link_header, Link};

/// The outcome of one successful HTTP exchange
pub struct HttpResult {
    status: StatusCode,
    headers: HeaderMap,
    content: Bytes,
    url: Url,
    method: Method,
    text: OnceCell<String>,
    json: OnceCell<Option<JsonValue>>,
}

impl HttpResult {
    pub fn new(status: StatusCode, headers: HeaderMap, content: Bytes, url: Url, method: Method) -> Self {
        Self {
            status,
            headers,
            content,
            url,
            method,
            text: OnceCell::new(),
            json: OnceCell::new(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase, empty for unregistered codes
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// False for 4xx and 5xx responses
    pub fn ok(&self) -> bool {
        !(self.status.is_client_error() || self.status.is_server_error())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value by case-insensitive name, if it is valid text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Final URL, after any redirects the transport followed
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Charset declared by the Content-Type header, if any
    pub fn encoding(&self) -> Option<&'static Encoding> {
        let content_type = self.header(CONTENT_TYPE.as_str())?;
        let mime: mime::Mime = content_type.parse().ok()?;
        let charset = mime.get_param(mime::CHARSET)?;
        Encoding::for_label(charset.as_str().as_bytes())
    }

    /// Body decoded as text using the declared charset, UTF-8 otherwise
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| {
            let encoding = self.encoding().unwrap_or(UTF_8);
            let (text, _, _) = encoding.decode(&self.content);
            text.into_owned()
        })
    }

    /// Body parsed as JSON, `None` if it is not valid JSON
    pub fn json(&self) -> Option<&JsonValue> {
        self.json
            .get_or_init(|| serde_json::from_slice(&self.content).ok())
            .as_ref()
    }

    /// Body deserialized into a typed value
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.content)?)
    }

    /// A 3xx status with a Location header
    pub fn is_redirect(&self) -> bool {
        self.headers.contains_key(LOCATION)
            && matches!(self.status.as_u16(), 301 | 302 | 303 | 307 | 308)
    }

    pub fn is_permanent_redirect(&self) -> bool {
        self.headers.contains_key(LOCATION) && matches!(self.status.as_u16(), 301 | 308)
    }

    /// Cookies set by this response, keyed by name
    pub fn cookies(&self) -> IndexMap<String, Cookie<'static>> {
        let values = self.headers.get_all(SET_COOKIE).iter().filter_map(|v| v.to_str().ok());
        parse_set_cookie_headers(values)
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect()
    }

    /// Link header entries keyed by `rel`, or by URL when `rel` is missing
    pub fn links(&self) -> IndexMap<String, Link> {
        self.headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_link_header)
            .map(|link| (link.key().to_string(), link))
            .collect()
    }
}

impl fmt::Debug for HttpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResult")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("content_length", &self.content.len())
            .finish()
    }
}

impl fmt::Display for HttpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.url, self.status)
    }
}
