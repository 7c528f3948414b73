//! Text decoding helpers for incoming documents.

use std::borrow::Cow;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, trace};
use regex::bytes::Regex;

use super::types::error::{PrivilegeError, Result};

/// Compiled regex for the `encoding` pseudo-attribute of an XML declaration.
static DECLARED_ENCODING: OnceLock<Regex> = OnceLock::new();

/// Returns the cached XML declaration regex.
fn declared_encoding_regex() -> &'static Regex {
    DECLARED_ENCODING.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
            .expect("Invalid XML declaration regex pattern")
    })
}

/// Maps an encoding label to an encoding, normalizing GBK/GB2312 to GB18030.
pub fn parse_encoding(label: &str) -> Result<&'static Encoding> {
    let trimmed = label.trim();
    let normalized =
        if trimmed.eq_ignore_ascii_case("GBK") || trimmed.eq_ignore_ascii_case("GB2312") {
            "GB18030"
        } else {
            trimmed
        };
    Encoding::for_label(normalized.as_bytes())
        .ok_or_else(|| PrivilegeError::Encoding(format!("Unknown encoding '{}'", label)))
}

/// Decodes raw document bytes to text.
///
/// # Encoding Selection
/// 1. A byte-order mark (UTF-8, UTF-16LE, UTF-16BE)
/// 2. The `encoding` declared in the XML declaration
/// 3. UTF-8
///
/// An unknown declared encoding, or byte sequences that are malformed in the
/// selected encoding, are an error.
pub fn decode_document(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, payload) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => {
            debug!("Byte-order mark found, decoding as {}", encoding.name());
            (encoding, &bytes[bom_len..])
        }
        None => {
            let encoding = match declared_encoding_regex()
                .captures(bytes)
                .and_then(|caps| caps.get(1))
            {
                Some(label) => parse_encoding(&String::from_utf8_lossy(label.as_bytes()))?,
                None => UTF_8,
            };
            debug!("Decoding document as {}", encoding.name());
            (encoding, bytes)
        }
    };
    trace!("Document payload: {} bytes", payload.len());

    encoding
        .decode_without_bom_handling_and_without_replacement(payload)
        .ok_or_else(|| {
            PrivilegeError::Encoding(format!("Input is not valid {}", encoding.name()))
        })
}
