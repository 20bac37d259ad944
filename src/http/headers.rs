//! Header-name and date helpers shared by the parser and the response writer.

use std::time::SystemTime;

/// Returns the canonical form of a header name.
///
/// The first letter and every letter following a hyphen are upper-cased, the
/// rest lower-cased, so `content-TYPE` becomes `Content-Type`.
///
/// # Example
///
/// ```
/// # use vhostd::http::headers::canonical_header_key;
/// assert_eq!(canonical_header_key("content-type"), "Content-Type");
/// assert_eq!(canonical_header_key("HOST"), "Host");
/// ```
pub fn canonical_header_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = true;

    for c in key.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }

    out
}

/// Whether `key` is acceptable as a request header name: non-empty and made
/// only of ASCII letters, digits and hyphens.
pub fn is_valid_header_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Formats a point in time as an HTTP-date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}
