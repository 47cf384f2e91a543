//! Normalization passes for issue bodies and extracted answers.
//!
//! Each pass is a function `&str -> String` (or `&str -> &str`) applied in sequence.

/// Answer GitHub renders for an optional field left blank.
pub const NO_RESPONSE: &str = "No response";

/// Normalize a raw issue body before field extraction.
pub(crate) fn normalize_body(body: &str) -> String {
    let mut result = normalize_line_endings(body);
    result = strip_bom(&result).to_string();
    result
}

/// Clean a single extracted answer line.
///
/// Trims whitespace, then the `_..._` emphasis GitHub wraps placeholders in,
/// and maps the "No response" placeholder to an empty answer.
pub(crate) fn clean_value(raw: &str) -> String {
    let value = raw.trim().trim_matches('_');
    if value.eq_ignore_ascii_case(NO_RESPONSE) {
        return String::new();
    }
    value.to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings
// ---------------------------------------------------------------------------

/// Convert CRLF and lone CR line endings to LF.
fn normalize_line_endings(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\r', "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Byte-order mark
// ---------------------------------------------------------------------------

fn strip_bom(body: &str) -> &str {
    body.strip_prefix('\u{feff}').unwrap_or(body)
}
