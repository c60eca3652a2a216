//! UTF-8 byte-order-mark prepending for text payloads.

use std::sync::OnceLock;

use regex::Regex;

use crate::{Payload, SaveOptions};

/// UTF-8 encoding of U+FEFF.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

fn utf8_text_mime() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:text/\S*|application/xml|\S*/\S*\+xml)\s*;.*charset\s*=\s*utf-8")
            .expect("BOM MIME pattern is valid")
    })
}

/// Returns whether `mime_type` names UTF-8 text, HTML, or XML content.
pub fn is_utf8_text_mime(mime_type: &str) -> bool {
    utf8_text_mime().is_match(mime_type)
}

/// Prepends [`UTF8_BOM`] when `options.auto_bom` is set and the MIME type is UTF-8 text.
///
/// The content is not inspected for an existing mark: applying this twice yields two marks.
/// Callers apply it at most once per save.
pub fn prepend_bom(payload: &Payload, options: SaveOptions) -> Payload {
    if options.auto_bom && is_utf8_text_mime(payload.mime_type()) {
        payload.with_prefix(&UTF8_BOM)
    } else {
        payload.clone()
    }
}
