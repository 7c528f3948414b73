//! Registry of supported document formats, selected by MIME type.

use std::fmt;

use super::error::{PrivilegeError, Result};

/// A document format the reader and writer know how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegeFormat {
    /// `<privileges>` XML documents.
    Xml,
}

/// MIME types and the format each one selects.
const REGISTRY: &[(&str, PrivilegeFormat)] = &[
    ("text/xml", PrivilegeFormat::Xml),
    ("application/xml", PrivilegeFormat::Xml),
];

impl PrivilegeFormat {
    /// Looks up the format for a MIME type.
    ///
    /// Matching ignores ASCII case, surrounding whitespace and any
    /// parameters (`text/xml; charset=utf-8` selects [`PrivilegeFormat::Xml`]).
    pub fn from_mime(format_id: &str) -> Result<Self> {
        let essence = format_id.split(';').next().unwrap_or_default().trim();
        REGISTRY
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(essence))
            .map(|(_, format)| *format)
            .ok_or_else(|| PrivilegeError::UnsupportedFormat(format_id.to_string()))
    }

    /// The canonical MIME type of this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            PrivilegeFormat::Xml => "text/xml",
        }
    }
}

impl fmt::Display for PrivilegeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}
