// Narrow pattern extraction over the legacy server's HTML and cookie
// headers. Absence is an expected, handled case at nearly every step, so
// everything here returns Option instead of erroring.

use reqwest::header::{HeaderMap, CONTENT_TYPE, SET_COOKIE};

/// Hidden form field the legacy login page renders its CSRF token into.
const CSRF_FIELD: &str = r#"name="_csrf" value=""#;

/// Scan server-rendered HTML for the `_csrf` hidden field.
pub fn csrf_from_html(html: &str) -> Option<String> {
    let start = html.find(CSRF_FIELD)? + CSRF_FIELD.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    let token = &rest[..end];
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Pull a named cookie value out of a single raw `Set-Cookie` (or
/// `Cookie`) header string, e.g. `JSESSIONID=abc; Path=/; HttpOnly`.
pub fn cookie_value(raw: &str, name: &str) -> Option<String> {
    for part in raw.split(';') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix(name) {
            if let Some(value) = rest.strip_prefix('=') {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Find a named cookie across every `Set-Cookie` header on a response.
pub fn set_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| cookie_value(raw, name))
}

/// Collect `NAME=VALUE` pairs from every `Set-Cookie` header, dropping
/// attributes, for replay on the next request.
pub fn cookie_pairs(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .map(|pair| pair.trim().to_string())
        .filter(|pair| !pair.is_empty())
        .collect()
}

/// The legacy server answers misrouted or expired-token API calls with a
/// silently redirected HTML page; its presence means "not data".
pub fn is_html_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}
