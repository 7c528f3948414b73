//! Custom error types for the privilege-xml crate.

use thiserror::Error;

/// Broad classification of a [`PrivilegeError`].
///
/// Callers usually only need to know which of these happened; the variant
/// itself carries the offending name, prefix or identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The format identifier did not select any known format.
    UnsupportedFormat,
    /// The source text is malformed or references something it never declares.
    Parse,
    /// The document is well-formed but violates a document-level rule.
    Validation,
    /// The underlying stream failed.
    Io,
}

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum PrivilegeError {
    /// An error originating from the caller-supplied stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The format identifier (MIME type) is not supported.
    #[error("Unsupported format: '{0}'")]
    UnsupportedFormat(String),

    /// The markup itself is not well-formed.
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document is structurally invalid for a privilege definition document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An element is missing an attribute it cannot do without.
    #[error("Element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A qualified name uses a prefix that was never declared.
    #[error("Name '{name}' uses unbound namespace prefix '{prefix}'")]
    UnresolvedPrefix { name: String, prefix: String },

    /// A prefix or URI is already bound to something else.
    #[error("Cannot bind prefix '{prefix}' to '{uri}': conflicts with existing binding {existing}")]
    NamespaceConflict {
        prefix: String,
        uri: String,
        existing: String,
    },

    /// The text is not a valid `prefix:localName` qualified name.
    #[error("Invalid qualified name: '{0}'")]
    InvalidName(String),

    /// The input bytes could not be decoded as text.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The same privilege name is declared more than once in one document.
    #[error("Duplicate privilege definition: '{0}'")]
    DuplicateDefinition(String),
}

impl PrivilegeError {
    /// Returns the broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrivilegeError::Io(_) => ErrorKind::Io,
            PrivilegeError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            PrivilegeError::DuplicateDefinition(_) => ErrorKind::Validation,
            PrivilegeError::Xml(_)
            | PrivilegeError::Parse(_)
            | PrivilegeError::MissingAttribute { .. }
            | PrivilegeError::UnresolvedPrefix { .. }
            | PrivilegeError::NamespaceConflict { .. }
            | PrivilegeError::InvalidName(_)
            | PrivilegeError::Encoding(_) => ErrorKind::Parse,
        }
    }
}

/// A convenience `Result` type alias using the crate's `PrivilegeError` type.
pub type Result<T> = std::result::Result<T, PrivilegeError>;
