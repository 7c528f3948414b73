//! Core data structures for privilege definition documents.
//!
//! - [`QualifiedName`]: a `prefix:localName` name
//! - [`PrivilegeDefinition`]: one named, possibly abstract, possibly
//!   aggregating privilege

use std::fmt;
use std::str::FromStr;

use super::error::{PrivilegeError, Result};
use super::namespace::NamespaceTable;

/// Whether `text` is an XML NCName: a non-colonized name that starts with a
/// letter or `_` and continues with letters, digits, `.`, `-`, `_` or `·`.
pub(crate) fn is_ncname(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '\u{B7}'))
}

/// A name of the form `prefix:localName`.
///
/// A name written without a colon belongs to the empty prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    prefix: String,
    local_name: String,
}

impl QualifiedName {
    /// Creates a name from its parts.
    ///
    /// The local name must be an XML NCName; so must the prefix unless it is empty.
    pub fn new(prefix: impl Into<String>, local_name: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let local_name = local_name.into();
        if !is_ncname(&local_name) || !(prefix.is_empty() || is_ncname(&prefix)) {
            return Err(PrivilegeError::InvalidName(format!("{}:{}", prefix, local_name)));
        }
        Ok(Self { prefix, local_name })
    }

    /// Parses the textual `prefix:localName` form.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || PrivilegeError::InvalidName(text.to_string());
        match text.split_once(':') {
            Some(("", _)) => Err(invalid()),
            Some((prefix, local_name)) => Self::new(prefix, local_name).map_err(|_| invalid()),
            None => Self::new("", text).map_err(|_| invalid()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Renders the name as `{uri}localName` using the URI bound to its prefix.
    pub fn expanded(&self, namespaces: &NamespaceTable) -> Result<String> {
        let uri = namespaces
            .resolve_prefix(&self.prefix)
            .ok_or_else(|| PrivilegeError::UnresolvedPrefix {
                name: self.to_string(),
                prefix: self.prefix.clone(),
            })?;
        Ok(format!("{{{}}}{}", uri, self.local_name))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            f.write_str(&self.local_name)
        } else {
            write!(f, "{}:{}", self.prefix, self.local_name)
        }
    }
}

impl FromStr for QualifiedName {
    type Err = PrivilegeError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for QualifiedName {
    type Error = PrivilegeError;
    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

/// A named access-control capability.
///
/// Definitions are immutable once built. Two definitions are equal when the
/// name, the abstract flag and the aggregate sequence (in order) are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrivilegeDefinition {
    name: QualifiedName,
    is_abstract: bool,
    /// Empty when the privilege is not an aggregate.
    aggregates: Vec<QualifiedName>,
}

impl PrivilegeDefinition {
    pub fn new(name: QualifiedName, is_abstract: bool, aggregates: Vec<QualifiedName>) -> Self {
        Self {
            name,
            is_abstract,
            aggregates,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Abstract privileges cannot be granted directly.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Names this privilege is composed of, in declaration order.
    pub fn aggregates(&self) -> &[QualifiedName] {
        &self.aggregates
    }

    pub fn is_aggregate(&self) -> bool {
        !self.aggregates.is_empty()
    }

    /// Iterates over the prefixes used by the name and every aggregate.
    pub(crate) fn prefixes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.name)
            .chain(self.aggregates.iter())
            .map(QualifiedName::prefix)
    }
}

impl fmt::Display for PrivilegeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_abstract {
            f.write_str("abstract ")?;
        }
        write!(f, "{}", self.name)?;
        if self.is_aggregate() {
            let names: Vec<String> = self.aggregates.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}
