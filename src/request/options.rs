//! Per-call request options
//!
//! `RequestOptions` carries everything a call can customise besides the
//! method and URL. The verb helpers pass it through untouched.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::Error;
use crate::progress::{Progress, ProgressHandler};

/// A file attached to a multipart request
#[derive(Debug, Clone)]
pub enum HttpFile {
    /// Read from disk by the exchange task; name and type default from the path
    Path {
        path: PathBuf,
        filename: Option<String>,
        mime_type: Option<String>,
    },
    /// In-memory bytes
    Bytes {
        filename: String,
        data: Vec<u8>,
        mime_type: Option<String>,
    },
    /// In-memory text, sent as UTF-8
    Text {
        filename: String,
        text: String,
        mime_type: Option<String>,
    },
}

impl HttpFile {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        HttpFile::Path { path: path.into(), filename: None, mime_type: None }
    }

    pub fn bytes(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        HttpFile::Bytes { filename: filename.into(), data: data.into(), mime_type: None }
    }

    pub fn text(filename: impl Into<String>, text: impl Into<String>) -> Self {
        HttpFile::Text { filename: filename.into(), text: text.into(), mime_type: None }
    }

    /// Override the content type of the part
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        let mime = Some(mime.into());
        match &mut self {
            HttpFile::Path { mime_type, .. }
            | HttpFile::Bytes { mime_type, .. }
            | HttpFile::Text { mime_type, .. } => *mime_type = mime,
        }
        self
    }
}

/// Basic-auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Options for a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Appended to the URL query string, in order
    pub params: Vec<(String, String)>,
    /// Form fields; become text parts when files are attached
    pub data: Vec<(String, String)>,
    pub json: Option<JsonValue>,
    pub headers: IndexMap<String, String>,
    /// Multipart attachments keyed by form field name
    pub files: Vec<(String, HttpFile)>,
    pub auth: Option<Credentials>,
    pub cookies: IndexMap<String, String>,
    pub allow_redirects: bool,
    pub timeout: Option<Duration>,
    /// Appended verbatim after any params
    pub url_query: Option<String>,
    /// Raw body; wins over json, files and data
    pub body: Option<Vec<u8>>,
    pub progress: Option<ProgressHandler>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            params: Vec::new(),
            data: Vec::new(),
            json: None,
            headers: IndexMap::new(),
            files: Vec::new(),
            auth: None,
            cookies: IndexMap::new(),
            allow_redirects: true,
            timeout: None,
            url_query: None,
            body: None,
            progress: None,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.data.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, value: JsonValue) -> Self {
        self.json = Some(value);
        self
    }

    /// Serialize any value as the JSON body
    pub fn json_from<T: Serialize>(mut self, value: &T) -> Result<Self, Error> {
        self.json = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, field: impl Into<String>, file: HttpFile) -> Self {
        self.files.push((field.into(), file));
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Credentials {
            username: username.into(),
            password: Some(password.into()),
        });
        self
    }

    /// Basic auth with a username and no password
    pub fn basic_auth_user(mut self, username: impl Into<String>) -> Self {
        self.auth = Some(Credentials {
            username: username.into(),
            password: None,
        });
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = allow;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn url_query(mut self, query: impl Into<String>) -> Self {
        self.url_query = Some(query.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress = Some(ProgressHandler::new(f));
        self
    }
}
