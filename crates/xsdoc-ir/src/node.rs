//! Node types for the schema tree
#![allow(clippy::must_use_candidate)] // Accessors read clearly at call sites without #[must_use].
#![allow(clippy::return_self_not_must_use)] // Fluent builders return Self for chaining.

use crate::metadata::Position;
use serde::{Deserialize, Serialize};

/// Namespace URI of the XML Schema language itself.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Namespace URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A node in the schema tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Local tag name (empty for text and comment nodes)
    pub name: String,

    /// Namespace URI of the tag, if any
    pub namespace: Option<String>,

    /// Node type
    pub node_type: NodeType,

    /// Attributes in source order
    pub attributes: Vec<Attribute>,

    /// Child nodes in source order
    pub children: Vec<Node>,

    /// Character content of text and comment nodes
    pub text: Option<String>,

    /// Where the node starts in its source file
    pub position: Option<Position>,
}

/// Types of nodes in the schema tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Element with a tag name, attributes and children
    Element,

    /// Non-whitespace character data
    Text,

    /// XML comment
    Comment,
}

/// A single attribute on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Local attribute name
    pub name: String,

    /// Namespace URI for qualified attributes such as `xml:lang`
    pub namespace: Option<String>,

    /// Attribute value
    pub value: String,
}

impl Attribute {
    /// Create an unqualified attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            value: value.into(),
        }
    }
}

impl Node {
    /// Create a new element node without a namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            node_type: NodeType::Element,
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
            position: None,
        }
    }

    /// Create an element in the XML Schema namespace
    pub fn xsd(name: impl Into<String>) -> Self {
        Self::new(name).in_namespace(XSD_NAMESPACE)
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            namespace: None,
            node_type: NodeType::Text,
            attributes: Vec::new(),
            children: Vec::new(),
            text: Some(content.into()),
            position: None,
        }
    }

    /// Create a comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Comment,
            ..Self::text(content)
        }
    }

    /// Set the namespace of this node
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Builder form of [`Node::set_attribute`]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Builder form of [`Node::add_child`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Set an unqualified attribute, replacing an existing value
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.name == key)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(key, value)),
        }
        self
    }

    /// Get an unqualified attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == key)
            .map(|a| a.value.as_str())
    }

    /// Whether this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Whether this is an element of the XML Schema namespace with the given local name
    pub fn is_xsd(&self, local_name: &str) -> bool {
        self.is_element()
            && self.name == local_name
            && self.namespace.as_deref() == Some(XSD_NAMESPACE)
    }

    /// Iterate over element children only
    pub fn elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// Find the first element child by local name
    pub fn find_child(&self, name: &str) -> Option<&Node> {
        self.elements().find(|c| c.name == name)
    }

    /// Find all element children by local name
    pub fn find_children(&self, name: &str) -> Vec<&Node> {
        self.elements().filter(|c| c.name == name).collect()
    }
}
