//! Character encoding detection and transcoding for local HTML files.
//!
//! Reference pages loaded from disk declare their charset in a meta tag more
//! often than they arrive as clean UTF-8; this module sniffs the declaration
//! and converts to UTF-8 before parsing.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Matches both `<meta charset="...">` and the `charset=` parameter of a
/// `Content-Type` meta tag.
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;>]+)"#).expect("valid regex")
});

/// Detect the character encoding declared by an HTML byte stream.
///
/// Only the first 1024 bytes are examined. Unknown or missing declarations
/// fall back to UTF-8, the web default.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    let head = &html[..html.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    if let Some(captures) = META_CHARSET.captures(&head_str) {
        if let Some(label) = captures.get(1) {
            if let Some(encoding) = Encoding::for_label(label.as_str().as_bytes()) {
                return encoding;
            }
        }
    }

    UTF_8
}

/// Transcode HTML bytes to a UTF-8 string.
///
/// Invalid characters are replaced with the Unicode replacement character
/// rather than causing errors.
#[must_use]
pub fn transcode_to_utf8(html: &[u8]) -> String {
    let encoding = detect_encoding(html);

    if encoding == UTF_8 {
        return String::from_utf8_lossy(html).into_owned();
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(html);
    decoded.into_owned()
}
