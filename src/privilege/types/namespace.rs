//! Prefix ↔ URI bindings in force for one read or write operation.

use std::fmt;

use super::error::{PrivilegeError, Result};
use super::models::is_ncname;

/// URI permanently bound to the `xml` prefix.
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix that only ever introduces namespace declarations.
const XMLNS_PREFIX: &str = "xmlns";

/// Bindings every reader starts from.
const WELL_KNOWN: &[(&str, &str)] = &[("", ""), ("xml", XML_NAMESPACE_URI)];

/// A bidirectional prefix ↔ URI mapping.
///
/// Bindings are kept in insertion order. Each prefix maps to exactly one URI
/// and each URI to exactly one prefix; [`bind`](Self::bind) refuses anything
/// that would break this. Tables are small, so lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    bindings: Vec<(String, String)>,
}

impl NamespaceTable {
    /// Creates a table with no bindings at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding the well-known bindings: the empty prefix for
    /// the empty namespace and `xml` for the XML namespace.
    pub fn with_defaults() -> Self {
        Self {
            bindings: WELL_KNOWN
                .iter()
                .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
                .collect(),
        }
    }

    /// Builds a table by binding every pair in turn.
    pub fn from_pairs<I, P, U>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, U)>,
        P: AsRef<str>,
        U: AsRef<str>,
    {
        let mut table = Self::new();
        for (prefix, uri) in pairs {
            table.bind(prefix.as_ref(), uri.as_ref())?;
        }
        Ok(table)
    }

    /// Returns the URI bound to `prefix`, if any.
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Returns the prefix bound to `uri`, if any.
    pub fn resolve_uri(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Binds `prefix` to `uri`.
    ///
    /// Binding an identical pair again is a no-op. Fails with
    /// [`PrivilegeError::NamespaceConflict`] when the prefix is already bound
    /// to another URI, the URI to another prefix, or the prefix is `xmlns`.
    /// A non-empty prefix that is not an XML NCName is
    /// [`PrivilegeError::InvalidName`].
    pub fn bind(&mut self, prefix: &str, uri: &str) -> Result<()> {
        if !prefix.is_empty() && !is_ncname(prefix) {
            return Err(PrivilegeError::InvalidName(prefix.to_string()));
        }

        let conflict = |existing: String| PrivilegeError::NamespaceConflict {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            existing,
        };

        if prefix == XMLNS_PREFIX {
            return Err(conflict("'xmlns' (reserved prefix)".to_string()));
        }

        for (p, u) in &self.bindings {
            match (p == prefix, u == uri) {
                (true, true) => return Ok(()),
                (true, false) | (false, true) => {
                    return Err(conflict(format!("'{}' -> '{}'", p, u)));
                }
                (false, false) => {}
            }
        }

        self.bindings.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.bindings.iter().any(|(p, _)| p == prefix)
    }

    /// Whether `prefix` is one of the well-known prefixes that are never
    /// declared explicitly in a document.
    pub fn is_reserved(prefix: &str) -> bool {
        WELL_KNOWN.iter().any(|(p, _)| *p == prefix)
    }

    /// Iterates over `(prefix, uri)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for NamespaceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (prefix, uri)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?} -> {:?}", prefix, uri)?;
        }
        f.write_str("}")
    }
}
