//! Schema loader: file → owned [`SchemaDocument`]

use crate::config::ResolverConfig;
use crate::LoadError;
use roxmltree::ParsingOptions;
use std::path::Path;
use tracing::{debug, trace};
use xsdoc_ir::{
    Attribute, NamespaceMap, Node, Position, SchemaDocument, SourceInfo, XSD_NAMESPACE,
};

/// Parses schema files into owned trees
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    config: ResolverConfig,
}

impl SchemaLoader {
    /// Create a loader with the given configuration
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Load and parse a schema file
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] when the file is missing, unreadable, too
    /// large, not well-formed XML, or not an XML Schema document.
    pub fn load(&self, path: &Path) -> Result<SchemaDocument, LoadError> {
        trace!(path = %path.display(), "Loading schema file");

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::io(path, e.to_string()),
        })?;

        self.load_from_str(&content, path)
    }

    /// Parse schema text; `path` is used for provenance and error messages
    ///
    /// # Errors
    ///
    /// Same as [`SchemaLoader::load`], minus the I/O failures.
    pub fn load_from_str(&self, content: &str, path: &Path) -> Result<SchemaDocument, LoadError> {
        if content.len() > self.config.max_document_size {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                size: content.len(),
                max: self.config.max_document_size,
            });
        }

        let options = ParsingOptions {
            allow_dtd: self.config.allow_dtd,
            ..Default::default()
        };
        let xml = roxmltree::Document::parse_with_options(content, options)
            .map_err(|e| LoadError::malformed(path, e.to_string()))?;
        let container = xml.root_element();

        if container.tag_name().name() != "schema"
            || container.tag_name().namespace() != Some(XSD_NAMESPACE)
        {
            return Err(LoadError::NotASchema {
                path: path.to_path_buf(),
                found: container.tag_name().name().to_string(),
            });
        }

        let mut namespaces = NamespaceMap::new();
        for ns in container.namespaces() {
            if ns.name() == Some("xml") {
                continue;
            }
            namespaces.declare(ns.name(), ns.uri());
        }

        let root = convert_element(&xml, container);
        let document = SchemaDocument::new(root, namespaces)
            .with_source(SourceInfo::new(path.display().to_string()));

        debug!(
            path = %path.display(),
            target_namespace = document.target_namespace.as_deref().unwrap_or(""),
            declarations = document.namespaces.len(),
            "Parsed schema"
        );

        Ok(document)
    }
}

/// Copy a roxmltree element into an owned node
///
/// Processing instructions and whitespace-only text are dropped.
fn convert_element(xml: &roxmltree::Document<'_>, element: roxmltree::Node<'_, '_>) -> Node {
    let tag = element.tag_name();
    let pos = xml.text_pos_at(element.range().start);

    let mut node = Node::new(tag.name());
    node.namespace = tag.namespace().map(str::to_string);
    node.position = Some(Position::new(pos.row, pos.col));
    node.attributes = element
        .attributes()
        .map(|a| Attribute {
            name: a.name().to_string(),
            namespace: a.namespace().map(str::to_string),
            value: a.value().to_string(),
        })
        .collect();

    for child in element.children() {
        if child.is_element() {
            node.add_child(convert_element(xml, child));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if !text.trim().is_empty() {
                node.add_child(Node::text(text));
            }
        } else if child.is_comment() {
            node.add_child(Node::comment(child.text().unwrap_or_default()));
        }
    }

    node
}
