//! Resolution model: root context, import record, merged tree

use crate::events::ResolutionEvent;
use crate::registry::NamespaceRegistry;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use xsdoc_ir::{NamespaceMap, Node};

/// Category of a top-level definition, as shown to readers of the documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefinitionCategory {
    Element,
    Type,
    Group,
    AttributeGroup,
    Attribute,
}

impl DefinitionCategory {
    /// Category of an XML Schema definition tag, `None` for non-definitions
    #[must_use]
    pub fn from_tag(local_name: &str) -> Option<Self> {
        match local_name {
            "element" => Some(Self::Element),
            "complexType" | "simpleType" => Some(Self::Type),
            "group" => Some(Self::Group),
            "attributeGroup" => Some(Self::AttributeGroup),
            "attribute" => Some(Self::Attribute),
            _ => None,
        }
    }

    /// Stable lower-case label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Type => "type",
            Self::Group => "group",
            Self::AttributeGroup => "attribute-group",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for DefinitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The root document's namespace and its self-prefix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootContext {
    /// Root `targetNamespace`, `None` for the no-namespace bucket
    pub target_namespace: Option<String>,

    /// Explicit prefix the root declares for its own target namespace
    pub root_prefix: Option<String>,
}

impl RootContext {
    /// Derive the context from the root's target namespace and declarations
    ///
    /// The first explicit prefix bound to the target namespace wins; a default
    /// namespace declaration alone leaves root content unprefixed.
    #[must_use]
    pub fn new(target_namespace: Option<&str>, namespaces: &NamespaceMap) -> Self {
        let root_prefix = target_namespace
            .and_then(|tns| namespaces.first_prefix_for(tns))
            .map(str::to_string);
        Self {
            target_namespace: target_namespace.map(str::to_string),
            root_prefix,
        }
    }

    /// Whether `namespace` is the root's own namespace
    ///
    /// Absent namespaces compare equal, so no-namespace documents under a
    /// no-namespace root are treated as root content.
    #[must_use]
    pub fn is_root_namespace(&self, namespace: Option<&str>) -> bool {
        self.target_namespace.as_deref() == namespace
    }
}

/// Schema files already resolved in this run
#[derive(Debug, Default)]
pub struct ImportRecord {
    seen: HashSet<PathBuf>,
}

impl ImportRecord {
    /// Create an empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path; returns false if it was already present
    pub fn insert(&mut self, path: impl Into<PathBuf>) -> bool {
        self.seen.insert(path.into())
    }

    /// Whether a path was already recorded
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    /// Number of recorded paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing is recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// The root schema with every reachable definition merged in
#[derive(Debug, Clone, Serialize)]
pub struct MergedTree {
    /// The merged `schema` container
    pub schema: Node,

    /// Path of the root schema
    pub root_path: PathBuf,

    /// Documents that contributed definitions, in processing order (root first)
    pub sources: Vec<PathBuf>,
}

impl MergedTree {
    /// Top-level definitions of the merged tree
    pub fn definitions(&self) -> impl Iterator<Item = &Node> {
        self.schema
            .elements()
            .filter(|n| DefinitionCategory::from_tag(&n.name).is_some())
    }
}

/// Everything a resolution run hands to the rendering layer
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// The merged tree
    pub merged: MergedTree,

    /// Root namespace and prefix
    pub root: RootContext,

    /// Final namespace → prefix assignments
    pub namespaces: NamespaceRegistry,

    /// Structured events recorded during the run
    pub events: Vec<ResolutionEvent>,
}

impl Resolution {
    /// Imports that were skipped, as `(path, reason)` pairs
    pub fn skipped_imports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.events.iter().filter_map(|event| match event {
            ResolutionEvent::ImportSkipped { path, reason } => Some((path.as_str(), reason.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_tag() {
        assert_eq!(
            DefinitionCategory::from_tag("simpleType"),
            Some(DefinitionCategory::Type)
        );
        assert_eq!(
            DefinitionCategory::from_tag("attributeGroup").map(DefinitionCategory::as_str),
            Some("attribute-group")
        );
        assert_eq!(DefinitionCategory::from_tag("annotation"), None);
        assert_eq!(DefinitionCategory::from_tag("import"), None);
    }

    #[test]
    fn test_root_context_prefix_detection() {
        let namespaces = NamespaceMap::new()
            .with(None, "urn:sfw")
            .with(Some("tdt"), "urn:tdt")
            .with(Some("sfw"), "urn:sfw");

        let ctx = RootContext::new(Some("urn:sfw"), &namespaces);
        assert_eq!(ctx.root_prefix.as_deref(), Some("sfw"));
        assert!(ctx.is_root_namespace(Some("urn:sfw")));
        assert!(!ctx.is_root_namespace(None));
    }

    #[test]
    fn test_root_context_default_namespace_only() {
        let namespaces = NamespaceMap::new().with(None, "urn:sfw");
        let ctx = RootContext::new(Some("urn:sfw"), &namespaces);
        assert!(ctx.root_prefix.is_none());
    }

    #[test]
    fn test_no_namespace_root() {
        let ctx = RootContext::new(None, &NamespaceMap::new());
        assert!(ctx.is_root_namespace(None));
        assert!(!ctx.is_root_namespace(Some("urn:x")));
    }

    #[test]
    fn test_import_record_dedup() {
        let mut record = ImportRecord::new();
        assert!(record.insert("/schemas/mmc.xsd"));
        assert!(!record.insert("/schemas/mmc.xsd"));
        assert!(record.contains(Path::new("/schemas/mmc.xsd")));
        assert_eq!(record.len(), 1);
    }
}
