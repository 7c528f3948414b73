//! Privilege definition reading and writing.

pub mod format;
pub mod reader;
pub mod types;
pub mod utils;
pub mod writer;

pub use reader::PrivilegeDefinitionReader;
pub use types::error::{ErrorKind, PrivilegeError, Result};
pub use writer::PrivilegeDefinitionWriter;
