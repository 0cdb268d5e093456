//! Cookie utilities
//!
//! Parsing of `Set-Cookie` response headers into typed cookies.

use cookie::Cookie;

/// Split a folded Set-Cookie header value into individual cookies
///
/// Handles the tricky case where cookie values may contain commas
/// (e.g., in Expires date), but cookies are separated by ", name=".
pub fn split_cookies(cookies: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for (i, c) in cookies.char_indices() {
        if c == ',' && cookies[i + 1..].starts_with(' ') && looks_like_cookie_start(&cookies[i + 2..]) {
            result.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(c);
    }

    if !current.trim().is_empty() {
        result.push(current.trim().to_string());
    }

    result
}

/// Parse Set-Cookie header values into typed cookies
///
/// Each value may itself hold several folded cookies. Unparseable entries are
/// skipped.
pub fn parse_set_cookie_headers<'a, I>(headers: I) -> Vec<Cookie<'static>>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .flat_map(split_cookies)
        .filter_map(|s| Cookie::parse(s).ok())
        .map(|c| c.into_owned())
        .collect()
}

/// Check if string starts with a cookie name pattern (token=)
fn looks_like_cookie_start(s: &str) -> bool {
    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-' => {}
        _ => return false,
    }

    for c in chars {
        if c == '=' {
            return true;
        }
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
            return false;
        }
    }

    false
}
