//! Per-document namespace declarations

use crate::node::XML_NAMESPACE;
use serde::{Deserialize, Serialize};

/// One `xmlns` / `xmlns:prefix` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDeclaration {
    /// Declared prefix, `None` for the default namespace
    pub prefix: Option<String>,

    /// Bound namespace URI
    pub uri: String,
}

/// Prefix to namespace URI bindings declared on a document's container node
///
/// Declaration order is preserved; it decides which prefix is reported first
/// when a URI is bound more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceMap {
    declarations: Vec<NamespaceDeclaration>,
}

impl NamespaceMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration; a repeated prefix replaces the earlier binding
    pub fn declare(&mut self, prefix: Option<&str>, uri: impl Into<String>) {
        let prefix = prefix.filter(|p| !p.is_empty()).map(str::to_string);
        let uri = uri.into();
        match self.declarations.iter_mut().find(|d| d.prefix == prefix) {
            Some(existing) => existing.uri = uri,
            None => self.declarations.push(NamespaceDeclaration { prefix, uri }),
        }
    }

    /// Builder form of [`NamespaceMap::declare`]
    #[must_use]
    pub fn with(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.declare(prefix, uri);
        self
    }

    /// Resolve a prefix (`None` for the default namespace)
    ///
    /// The `xml` prefix is always bound, declared or not.
    #[must_use]
    pub fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        let found = self
            .declarations
            .iter()
            .find(|d| d.prefix.as_deref() == prefix)
            .map(|d| d.uri.as_str());
        match (found, prefix) {
            (None, Some("xml")) => Some(XML_NAMESPACE),
            _ => found,
        }
    }

    /// The default namespace, if declared
    #[must_use]
    pub fn default_namespace(&self) -> Option<&str> {
        self.lookup(None)
    }

    /// First explicit prefix declared for `uri`
    #[must_use]
    pub fn first_prefix_for(&self, uri: &str) -> Option<&str> {
        self.declarations
            .iter()
            .filter(|d| d.uri == uri)
            .find_map(|d| d.prefix.as_deref())
    }

    /// Explicit prefixes bound to `uri`
    pub fn prefixes_for<'a>(&'a self, uri: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.declarations
            .iter()
            .filter(move |d| d.uri == uri)
            .filter_map(|d| d.prefix.as_deref())
    }

    /// Declarations in source order
    pub fn iter(&self) -> impl Iterator<Item = &NamespaceDeclaration> {
        self.declarations.iter()
    }

    /// Number of declarations
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether nothing is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
