//! Document representation for a single schema file
#![allow(clippy::must_use_candidate)] // Builder/constructor API intentionally omits pervasive #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builder methods return Self for ergonomics.

use crate::metadata::SourceInfo;
use crate::namespace::NamespaceMap;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// One parsed schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// The `schema` container node
    pub root: Node,

    /// Namespace declarations visible on the container node
    pub namespaces: NamespaceMap,

    /// Declared `targetNamespace`; `None` when absent or empty
    pub target_namespace: Option<String>,

    /// Document-level metadata
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source information (file, how it was reached)
    pub source: Option<SourceInfo>,

    /// Value of the container's `version` attribute
    pub version: Option<String>,
}

impl SchemaDocument {
    /// Create a new document with the given container node
    pub fn new(root: Node, namespaces: NamespaceMap) -> Self {
        let target_namespace = root
            .attribute("targetNamespace")
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        let version = root.attribute("version").map(str::to_string);
        Self {
            root,
            namespaces,
            target_namespace,
            metadata: DocumentMetadata {
                source: None,
                version,
            },
        }
    }

    /// Set the source information
    pub fn with_source(mut self, source: SourceInfo) -> Self {
        self.metadata.source = Some(source);
        self
    }

    /// Source path or identifier, empty when unknown
    pub fn source(&self) -> &str {
        self.metadata
            .source
            .as_ref()
            .map_or("", |s| s.source.as_str())
    }

    /// Element children of the container node
    pub fn top_level(&self) -> impl Iterator<Item = &Node> {
        self.root.elements()
    }
}
