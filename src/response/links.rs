//! Link header parsing (RFC 8288)

use std::collections::HashMap;

/// One entry of a Link header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Parameters with surrounding quotes removed, names lowercased
    pub params: HashMap<String, String>,
}

impl Link {
    pub fn rel(&self) -> Option<&str> {
        self.params.get("rel").map(String::as_str)
    }

    pub(crate) fn key(&self) -> &str {
        self.rel().unwrap_or(&self.url)
    }
}

/// Parse a Link header value into its entries
///
/// Malformed entries (no `<url>`) are skipped.
pub fn parse_link_header(value: &str) -> Vec<Link> {
    split_entries(value)
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.trim();
            let rest = entry.strip_prefix('<')?;
            let end = rest.find('>')?;
            let url = rest[..end].trim().to_string();

            let params = rest[end + 1..]
                .split(';')
                .filter_map(|param| {
                    let (name, value) = param.split_once('=')?;
                    let value = value.trim().trim_matches('"');
                    Some((name.trim().to_ascii_lowercase(), value.to_string()))
                })
                .collect();

            Some(Link { url, params })
        })
        .collect()
}

/// Split on commas that are outside `<...>` and quoted strings
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_url = false;
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '<' if !in_quotes => in_url = true,
            '>' if !in_quotes => in_url = false,
            '"' if !in_url => in_quotes = !in_quotes,
            ',' if !in_url && !in_quotes => {
                entries.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);
    entries
}
