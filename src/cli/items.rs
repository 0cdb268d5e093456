//! Request item parser
//!
//! Parses CLI strings like "Header:Value", "name==value", "key=value",
//! "key:=json" and "field@path" and folds them into `RequestOptions`.

use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;

use crate::errors::Error;
use crate::request::{HttpFile, RequestOptions};

/// A parsed CLI request item
#[derive(Debug, Clone, PartialEq)]
pub enum RequestItem {
    /// "Name:Value"
    Header { name: String, value: String },
    /// "name==value"
    QueryParam { name: String, value: String },
    /// "key=value": form field, or JSON string field with --json
    DataField { key: String, value: String },
    /// "key:=value" where value is raw JSON
    JsonField { key: String, value: JsonValue },
    /// "field@path"
    FileUpload { field: String, path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeparatorKind {
    Header,
    QueryParam,
    DataField,
    JsonField,
    FileUpload,
}

/// Longest separators first so "==" and ":=" win over "=" and ":"
const SEPARATORS: &[(&str, SeparatorKind)] = &[
    ("==", SeparatorKind::QueryParam),
    (":=", SeparatorKind::JsonField),
    (":", SeparatorKind::Header),
    ("=", SeparatorKind::DataField),
    ("@", SeparatorKind::FileUpload),
];

/// Parse a CLI request item
///
/// The earliest separator in the input wins; at equal positions the longer
/// one does.
pub fn parse(input: &str) -> Result<RequestItem, Error> {
    let mut best: Option<(usize, &str, SeparatorKind)> = None;

    for &(sep, kind) in SEPARATORS {
        if let Some(pos) = input.find(sep) {
            let better = match best {
                None => true,
                Some((best_pos, best_sep, _)) => pos < best_pos || (pos == best_pos && sep.len() > best_sep.len()),
            };
            if better {
                best = Some((pos, sep, kind));
            }
        }
    }

    let (pos, sep, kind) = best.ok_or_else(|| {
        Error::Argument(format!(
            "Invalid request item '{}': use Header:Value, name==value, key=value, key:=json or field@path",
            input
        ))
    })?;

    let key = &input[..pos];
    let value = &input[pos + sep.len()..];
    if key.is_empty() {
        return Err(Error::Argument(format!("Invalid request item '{}': empty key", input)));
    }

    Ok(match kind {
        SeparatorKind::Header => RequestItem::Header {
            name: key.to_string(),
            value: value.trim_start().to_string(),
        },
        SeparatorKind::QueryParam => RequestItem::QueryParam {
            name: key.to_string(),
            value: value.to_string(),
        },
        SeparatorKind::DataField => RequestItem::DataField {
            key: key.to_string(),
            value: value.to_string(),
        },
        SeparatorKind::JsonField => RequestItem::JsonField {
            key: key.to_string(),
            value: serde_json::from_str(value)
                .map_err(|e| Error::Argument(format!("Invalid JSON in '{}': {}", input, e)))?,
        },
        SeparatorKind::FileUpload => RequestItem::FileUpload {
            field: key.to_string(),
            path: PathBuf::from(value),
        },
    })
}

/// Fold parsed items into request options
///
/// Data fields become JSON string fields when `json` is set or when any
/// raw JSON field is present; otherwise they are form fields.
pub fn apply(items: Vec<RequestItem>, json: bool, mut options: RequestOptions) -> RequestOptions {
    let json = json || items.iter().any(|i| matches!(i, RequestItem::JsonField { .. }));
    let mut object = Map::new();

    for item in items {
        match item {
            RequestItem::Header { name, value } => options = options.header(name, value),
            RequestItem::QueryParam { name, value } => options = options.param(name, value),
            RequestItem::DataField { key, value } if json => {
                object.insert(key, JsonValue::String(value));
            }
            RequestItem::DataField { key, value } => options = options.data(key, value),
            RequestItem::JsonField { key, value } => {
                object.insert(key, value);
            }
            RequestItem::FileUpload { field, path } => options = options.file(field, HttpFile::path(path)),
        }
    }

    if !object.is_empty() {
        options = options.json(JsonValue::Object(object));
    }
    options
}
