//! # privilege-xml
//!
//! Reads and writes privilege definition documents: named, possibly abstract
//! access-control privileges that may aggregate other privileges, plus the
//! namespace prefixes their names use.
//!
//! ```no_run
//! # use privilege_xml::{PrivilegeDefinitionReader, PrivilegeDefinitionWriter};
//! let file = std::fs::File::open("privileges.xml").unwrap();
//! let reader = PrivilegeDefinitionReader::new(file, "text/xml").unwrap();
//! for definition in reader.privilege_definitions() {
//!     println!("{}", definition);
//! }
//!
//! let writer = PrivilegeDefinitionWriter::new("text/xml").unwrap();
//! let xml = writer
//!     .write_to_string(reader.privilege_definitions(), reader.namespaces())
//!     .unwrap();
//! ```
pub mod privilege;

// Re-export the main types for convenience
pub use privilege::{
    ErrorKind, PrivilegeDefinitionReader, PrivilegeDefinitionWriter, PrivilegeError, Result,
    types::{
        format::PrivilegeFormat,
        models::{PrivilegeDefinition, QualifiedName},
        namespace::{NamespaceTable, XML_NAMESPACE_URI},
    },
};
