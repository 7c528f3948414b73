use std::io::Write;

use log::{info, warn};

use super::format;
use super::types::error::{PrivilegeError, Result};
use super::types::format::PrivilegeFormat;
use super::types::models::PrivilegeDefinition;
use super::types::namespace::NamespaceTable;

/// Indentation width used unless configured otherwise.
pub const DEFAULT_INDENT: usize = 4;

/// Writes privilege definitions as a document.
///
/// Output is canonical: the same definitions and namespaces always produce
/// the same bytes, and reading them back yields the same definitions.
#[derive(Debug, Clone)]
pub struct PrivilegeDefinitionWriter {
    format: PrivilegeFormat,
    indent: usize,
}

impl PrivilegeDefinitionWriter {
    /// Creates a writer for the format selected by `format_id`.
    ///
    /// # Errors
    /// Returns [`PrivilegeError::UnsupportedFormat`] if the identifier is unknown.
    pub fn new(format_id: &str) -> Result<Self> {
        Ok(Self {
            format: PrivilegeFormat::from_mime(format_id)?,
            indent: DEFAULT_INDENT,
        })
    }

    /// Sets the number of spaces per nesting level. Zero writes compact output.
    pub fn with_indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }

    pub fn format(&self) -> PrivilegeFormat {
        self.format
    }

    /// Writes `definitions`, in order, to `out`.
    ///
    /// Every binding in `namespaces` is declared, whether or not a definition
    /// uses it, except rebindings of the well-known `""` and `xml` prefixes,
    /// which are dropped with a warning. Names whose prefix is missing from
    /// `namespaces` are written anyway; the result will not read back.
    pub fn write_definitions<W: Write>(
        &self,
        out: W,
        definitions: &[PrivilegeDefinition],
        namespaces: &NamespaceTable,
    ) -> Result<()> {
        info!(
            "Writing {} privilege definitions ({})",
            definitions.len(),
            self.format
        );

        let defaults = NamespaceTable::with_defaults();
        for (prefix, uri) in namespaces.iter().filter(|(p, _)| NamespaceTable::is_reserved(p)) {
            if defaults.resolve_prefix(prefix) != Some(uri) {
                warn!(
                    "Binding '{}' -> '{}' overrides a well-known prefix and will not be written",
                    prefix, uri
                );
            }
        }

        for definition in definitions {
            if let Some(prefix) = definition.prefixes().find(|prefix| {
                !namespaces.contains_prefix(prefix) && !NamespaceTable::is_reserved(prefix)
            }) {
                warn!(
                    "Privilege '{}' uses prefix '{}' which is not in the namespace mapping",
                    definition.name(),
                    prefix
                );
            }
        }

        match self.format {
            PrivilegeFormat::Xml => {
                format::xml::write_document(out, definitions, namespaces, self.indent)
            }
        }
    }

    /// Writes `definitions` into a new string.
    pub fn write_to_string(
        &self,
        definitions: &[PrivilegeDefinition],
        namespaces: &NamespaceTable,
    ) -> Result<String> {
        let mut buf = Vec::new();
        self.write_definitions(&mut buf, definitions, namespaces)?;
        String::from_utf8(buf).map_err(|e| PrivilegeError::Encoding(e.to_string()))
    }
}
