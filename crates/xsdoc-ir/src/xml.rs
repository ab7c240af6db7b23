//! Rendering nodes back to XML text

use crate::namespace::NamespaceDeclaration;
use crate::node::{Node, NodeType, XML_NAMESPACE};
use crate::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Options for [`to_xml_string`]
///
/// The default renders a documentation snippet: two-space indentation, every
/// tag and attribute reduced to its local name, no namespace declarations.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line
    pub indent: usize,

    /// Namespace URI to prefix used when writing qualified tags and attributes
    pub prefixes: BTreeMap<String, String>,

    /// Declarations emitted on the outermost element
    pub declarations: Vec<NamespaceDeclaration>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            prefixes: BTreeMap::new(),
            declarations: Vec::new(),
        }
    }
}

impl WriteOptions {
    /// Bind a prefix for qualified output
    #[must_use]
    pub fn with_prefix(mut self, uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(uri.into(), prefix.into());
        self
    }

    /// Emit a declaration on the outermost element
    #[must_use]
    pub fn with_declaration(mut self, prefix: Option<&str>, uri: impl Into<String>) -> Self {
        self.declarations.push(NamespaceDeclaration {
            prefix: prefix.map(str::to_string),
            uri: uri.into(),
        });
        self
    }

    fn qualify(&self, namespace: Option<&str>, local: &str) -> String {
        let prefix = match namespace {
            Some(XML_NAMESPACE) => Some("xml"),
            Some(uri) => self.prefixes.get(uri).map(String::as_str),
            None => None,
        };
        match prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
            _ => local.to_string(),
        }
    }
}

/// Render a node and its subtree as XML text
///
/// # Errors
///
/// Returns [`Error::Serialize`] if the writer fails.
pub fn to_xml_string(node: &Node, options: &WriteOptions) -> Result<String> {
    let mut writer = if options.indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', options.indent)
    };

    write_node(&mut writer, node, options, true)?;

    String::from_utf8(writer.into_inner()).map_err(|e| Error::serialize(e.to_string()))
}

fn write_node(
    writer: &mut Writer<Vec<u8>>,
    node: &Node,
    options: &WriteOptions,
    outermost: bool,
) -> Result<()> {
    let event = match node.node_type {
        NodeType::Text => {
            let text = node.text.as_deref().unwrap_or_default();
            return emit(writer, Event::Text(BytesText::new(text)));
        }
        NodeType::Comment => {
            let text = node.text.as_deref().unwrap_or_default();
            let text = comment_text(text);
            return emit(writer, Event::Comment(BytesText::from_escaped(text.as_ref())));
        }
        NodeType::Element => {
            let tag = options.qualify(node.namespace.as_deref(), &node.name);
            let mut start = BytesStart::new(tag.clone());

            if outermost {
                for decl in &options.declarations {
                    let key = match decl.prefix.as_deref() {
                        Some(prefix) => format!("xmlns:{prefix}"),
                        None => "xmlns".to_string(),
                    };
                    start.push_attribute((key.as_str(), decl.uri.as_str()));
                }
            }
            for attr in &node.attributes {
                let key = options.qualify(attr.namespace.as_deref(), &attr.name);
                start.push_attribute((key.as_str(), attr.value.as_str()));
            }

            if node.children.is_empty() {
                Event::Empty(start)
            } else {
                emit(writer, Event::Start(start))?;
                for child in &node.children {
                    write_node(writer, child, options, false)?;
                }
                Event::End(BytesEnd::new(tag))
            }
        }
    };
    emit(writer, event)
}

/// Comment body that cannot close the comment early
///
/// `--` is split by a space and a trailing `-` is padded, so the output
/// stays well-formed for comments built in code.
fn comment_text(text: &str) -> Cow<'_, str> {
    if !text.contains("--") && !text.ends_with('-') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 2);
    for ch in text.chars() {
        if ch == '-' && out.ends_with('-') {
            out.push(' ');
        }
        out.push(ch);
    }
    if out.ends_with('-') {
        out.push(' ');
    }
    Cow::Owned(out)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::serialize(e.to_string()))
}
