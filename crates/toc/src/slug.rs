//! Anchor ids for headings that lack one.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Lowercase, hyphenate whitespace runs, then percent-encode.
///
/// Deterministic and not de-duplicated: equal texts give equal anchors.
pub fn anchor_from_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut hyphenated = String::with_capacity(lowered.len());
    let mut in_ws = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                hyphenated.push('-');
            }
            in_ws = true;
        } else {
            hyphenated.push(ch);
            in_ws = false;
        }
    }
    utf8_percent_encode(&hyphenated, URI_COMPONENT).to_string()
}
