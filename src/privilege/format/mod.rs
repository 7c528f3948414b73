//! Wire formats for privilege definition documents.
//!
//! Each [`PrivilegeFormat`](crate::PrivilegeFormat) variant has one module
//! here holding its read and write halves.
//!
//! - [`xml`]: the `<privileges>` XML document

pub mod xml;
