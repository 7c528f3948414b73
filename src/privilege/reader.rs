use std::io::Read;

use log::{debug, info};

use super::format;
use super::types::error::Result;
use super::types::format::PrivilegeFormat;
use super::types::models::PrivilegeDefinition;
use super::types::namespace::NamespaceTable;
use super::utils;

/// Reads privilege definitions from a document.
///
/// The whole document is read and validated when the reader is built, so a
/// reader that exists always holds a complete, valid result.
#[derive(Debug, Clone)]
pub struct PrivilegeDefinitionReader {
    format: PrivilegeFormat,
    definitions: Vec<PrivilegeDefinition>,
    namespaces: NamespaceTable,
}

impl PrivilegeDefinitionReader {
    /// Parses the document in `input` using the format selected by `format_id`.
    ///
    /// # Arguments
    /// * `input` - Stream holding the complete document
    /// * `format_id` - MIME type of the document, e.g. `text/xml`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The format identifier is unknown (the stream is not touched)
    /// - The stream cannot be read or decoded
    /// - The document is malformed or uses an undeclared prefix
    /// - A privilege name is declared twice
    pub fn new<R: Read>(mut input: R, format_id: &str) -> Result<Self> {
        let format = PrivilegeFormat::from_mime(format_id)?;
        info!("Reading privilege definitions ({})", format);

        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        debug!("Read {} bytes from input", bytes.len());
        let text = utils::decode_document(&bytes)?;

        let (definitions, namespaces) = match format {
            PrivilegeFormat::Xml => format::xml::read_document(&text)?,
        };

        info!(
            "Read {} privilege definitions, {} namespace bindings",
            definitions.len(),
            namespaces.len()
        );

        Ok(Self {
            format,
            definitions,
            namespaces,
        })
    }

    pub fn format(&self) -> PrivilegeFormat {
        self.format
    }

    /// The definitions in document order.
    pub fn privilege_definitions(&self) -> &[PrivilegeDefinition] {
        &self.definitions
    }

    /// Every namespace binding declared in the document, plus the well-known
    /// defaults the table starts from.
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Consumes the reader, handing the definitions and namespaces to the caller.
    pub fn into_parts(self) -> (Vec<PrivilegeDefinition>, NamespaceTable) {
        (self.definitions, self.namespaces)
    }
}
