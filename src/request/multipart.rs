//! Multipart form data handling
//!
//! Forms are built inside the exchange task, so file reads never block the
//! caller.

use reqwest::multipart::{Form, Part};

use super::options::HttpFile;
use crate::errors::Error;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Build a multipart form from text fields and attachments
pub async fn build_multipart_form(
    fields: Vec<(String, String)>,
    files: Vec<(String, HttpFile)>,
) -> Result<Form, Error> {
    let mut form = Form::new();

    for (name, value) in fields {
        form = form.text(name, value);
    }

    for (name, file) in files {
        form = form.part(name, create_file_part(file).await?);
    }

    Ok(form)
}

async fn create_file_part(file: HttpFile) -> Result<Part, Error> {
    let (part, mime_type) = match file {
        HttpFile::Path { path, filename, mime_type } => {
            let filename = filename
                .or_else(|| path.file_name().and_then(|n| n.to_str()).map(String::from))
                .unwrap_or_else(|| "file".to_string());
            let mime_type = mime_type.unwrap_or_else(|| guess_mime_type(&filename));
            // Part::file would stream, but its own filename/mime guessing would
            // fight the overrides above.
            let contents = tokio::fs::read(&path).await?;
            (Part::bytes(contents).file_name(filename), mime_type)
        }
        HttpFile::Bytes { filename, data, mime_type } => {
            let mime_type = mime_type.unwrap_or_else(|| guess_mime_type(&filename));
            (Part::bytes(data).file_name(filename), mime_type)
        }
        HttpFile::Text { filename, text, mime_type } => {
            let mime_type = mime_type.unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
            (Part::text(text).file_name(filename), mime_type)
        }
    };

    part.mime_str(&mime_type)
        .map_err(|e| Error::Multipart(format!("Invalid MIME type '{}': {}", mime_type, e)))
}

/// Guess MIME type from a file name
fn guess_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}
