//! Traversal and cursor APIs for navigating the schema tree

use crate::node::Node;
use crate::Error;
use crate::Result;

/// A cursor for navigating the schema tree
pub struct Cursor<'a> {
    /// Current node
    node: &'a Node,

    /// Path to current node (for error reporting)
    path: Vec<String>,
}

/// Trait for traversing the schema tree
pub trait Traversal {
    /// Visit a node
    fn visit(&mut self, node: &Node, path: &[String]);

    /// Called when entering a node with children
    fn enter(&mut self, _node: &Node, _path: &[String]) {}

    /// Called when leaving a node with children
    fn leave(&mut self, _node: &Node, _path: &[String]) {}

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

/// How a path segment selects among same-named children
enum Selector<'p> {
    First,
    Index(usize),
    Named(&'p str),
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given node
    #[must_use]
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            path: vec![node.name.clone()],
        }
    }

    /// Get the current node
    #[must_use]
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Get the current path
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Navigate using a path such as `complexType[@name=Order]/sequence/element[1]`
    ///
    /// A segment is a local name optionally followed by `[index]` or
    /// `[@name=value]`; empty segments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for malformed segments and
    /// [`Error::NodeNotFound`] when a segment matches nothing.
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut current = Cursor {
            node: self.node,
            path: self.path.clone(),
        };

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }

            let (name, selector) = parse_segment(segment)?;
            let mut candidates = current.node.elements().filter(|c| c.name == name);
            let found = match selector {
                Selector::First => candidates.next(),
                Selector::Index(index) => candidates.nth(index),
                Selector::Named(value) => candidates.find(|c| c.attribute("name") == Some(value)),
            };

            let node = found.ok_or_else(|| {
                Error::node_not_found(format!("{}/{}", current.path.join("/"), segment))
            })?;
            current = current.descend(node, segment.to_string());
        }

        Ok(current)
    }

    fn descend(&self, node: &'a Node, label: String) -> Cursor<'a> {
        let mut path = self.path.clone();
        path.push(label);
        Cursor { node, path }
    }
}

fn parse_segment(segment: &str) -> Result<(&str, Selector<'_>)> {
    let Some(open_bracket) = segment.find('[') else {
        return Ok((segment, Selector::First));
    };

    let name = &segment[..open_bracket];
    let inner = segment[open_bracket + 1..]
        .strip_suffix(']')
        .ok_or_else(|| Error::invalid_path(segment, "unclosed bracket"))?;

    if let Some(value) = inner.strip_prefix("@name=") {
        return Ok((name, Selector::Named(value)));
    }

    let index = inner
        .parse()
        .map_err(|_| Error::invalid_path(segment, "index is not a number"))?;
    Ok((name, Selector::Index(index)))
}

/// Walk the tree using a visitor
pub fn walk<T: Traversal>(node: &Node, visitor: &mut T) {
    walk_recursive(node, visitor, &mut vec![]);
}

fn walk_recursive<T: Traversal>(node: &Node, visitor: &mut T, path: &mut Vec<String>) {
    if !visitor.should_continue() {
        return;
    }

    visitor.visit(node, path);

    if !node.children.is_empty() {
        visitor.enter(node, path);
        path.push(node.name.clone());

        for child in &node.children {
            walk_recursive(child, visitor, path);
        }

        path.pop();
        visitor.leave(node, path);
    }
}

/// Apply `f` to `node` and every element below it, parents first
pub fn for_each_element_mut<F: FnMut(&mut Node)>(node: &mut Node, f: &mut F) {
    if !node.is_element() {
        return;
    }
    f(node);
    for child in &mut node.children {
        for_each_element_mut(child, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Node {
        Node::xsd("schema")
            .with_child(
                Node::xsd("complexType").with_attribute("name", "Order").with_child(
                    Node::xsd("sequence")
                        .with_child(Node::xsd("element").with_attribute("name", "id"))
                        .with_child(Node::xsd("element").with_attribute("name", "lines")),
                ),
            )
            .with_child(Node::comment("between"))
            .with_child(Node::xsd("complexType").with_attribute("name", "Line"))
    }

    #[test]
    fn test_cursor_creation() {
        let root = Node::xsd("schema");
        let cursor = Cursor::new(&root);

        assert_eq!(cursor.node().name, "schema");
        assert_eq!(cursor.path(), &["schema"]);
    }

    #[test]
    fn test_cursor_not_found_reports_path() {
        let root = sample_schema();
        let cursor = Cursor::new(&root);

        match cursor.navigate("complexType/simpleType") {
            Err(Error::NodeNotFound { path }) => {
                assert_eq!(path, "schema/complexType/simpleType");
            }
            _ => panic!("Expected NodeNotFound error"),
        }
    }

    #[test]
    fn test_cursor_navigate_by_name_and_index() {
        let root = sample_schema();
        let cursor = Cursor::new(&root);

        let lines = cursor
            .navigate("complexType[@name=Order]/sequence/element[1]")
            .unwrap();
        assert_eq!(lines.node().attribute("name"), Some("lines"));
        assert_eq!(lines.path().len(), 4);

        let by_first = cursor.navigate("//complexType//").unwrap();
        assert_eq!(by_first.node().attribute("name"), Some("Order"));
    }

    #[test]
    fn test_cursor_navigate_errors() {
        let root = sample_schema();
        let cursor = Cursor::new(&root);

        assert!(matches!(
            cursor.navigate("complexType[@name=Missing]"),
            Err(Error::NodeNotFound { .. })
        ));
        assert!(matches!(
            cursor.navigate("complexType[5]"),
            Err(Error::NodeNotFound { .. })
        ));
        assert!(matches!(
            cursor.navigate("complexType[0"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            cursor.navigate("complexType[abc]"),
            Err(Error::InvalidPath { .. })
        ));
    }

    struct NameCollector {
        visited: Vec<String>,
        entered: Vec<String>,
        max_visits: usize,
    }

    impl Traversal for NameCollector {
        fn visit(&mut self, node: &Node, _path: &[String]) {
            if node.is_element() {
                self.visited.push(node.name.clone());
            }
        }

        fn enter(&mut self, node: &Node, _path: &[String]) {
            self.entered.push(node.name.clone());
        }

        fn should_continue(&self) -> bool {
            self.visited.len() < self.max_visits
        }
    }

    #[test]
    fn test_walk_visits_in_document_order() {
        let root = sample_schema();
        let mut visitor = NameCollector {
            visited: Vec::new(),
            entered: Vec::new(),
            max_visits: usize::MAX,
        };
        walk(&root, &mut visitor);

        assert_eq!(
            visitor.visited,
            vec!["schema", "complexType", "sequence", "element", "element", "complexType"]
        );
        assert_eq!(visitor.entered, vec!["schema", "complexType", "sequence"]);
    }

    #[test]
    fn test_walk_should_continue() {
        let root = sample_schema();
        let mut visitor = NameCollector {
            visited: Vec::new(),
            entered: Vec::new(),
            max_visits: 2,
        };
        walk(&root, &mut visitor);

        assert_eq!(visitor.visited, vec!["schema", "complexType"]);
    }

    #[test]
    fn test_for_each_element_mut() {
        let mut root = sample_schema();
        let mut count = 0;
        for_each_element_mut(&mut root, &mut |node| {
            count += 1;
            if node.attribute("name") == Some("id") {
                node.set_attribute("type", "xsd:int");
            }
        });

        assert_eq!(count, 6);
        let id = Cursor::new(&root)
            .navigate("complexType/sequence/element[@name=id]")
            .unwrap();
        assert_eq!(id.node().attribute("type"), Some("xsd:int"));
    }
}
