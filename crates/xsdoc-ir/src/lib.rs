#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # xsdoc-ir
//!
//! Owned tree structures and traversal APIs for XML Schema documents.
//!
//! Schema files are parsed once into [`SchemaDocument`] values and never
//! mutated afterwards; merged output is built from copies of their nodes.
//! Reference values are handled through the [`Name`] variant type instead of
//! ad-hoc string slicing.

/// Document container and per-file metadata.
pub mod document;
/// Source positions and provenance.
pub mod metadata;
/// Per-document namespace declarations.
pub mod namespace;
/// Core tree node model.
pub mod node;
/// Prefixed/unprefixed name values.
pub mod qname;
/// Cursor-based traversal helpers for navigating schema trees.
pub mod traversal;
/// XML text rendering.
pub mod xml;

pub use document::{DocumentMetadata, SchemaDocument};
pub use metadata::{Position, SourceInfo};
pub use namespace::{NamespaceDeclaration, NamespaceMap};
pub use node::{Attribute, Node, NodeType, XML_NAMESPACE, XSD_NAMESPACE};
pub use qname::Name;
pub use traversal::{Cursor, Traversal};
pub use xml::{to_xml_string, WriteOptions};

use thiserror::Error;

/// Errors that can occur when working with the schema tree
#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Failed to write XML: {message}")]
    Serialize { message: String },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build an invalid-path error with input path and parsing reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a serialization error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }
}

/// Crate-local result type for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
