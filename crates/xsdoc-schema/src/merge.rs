//! Merge assembler: collects rewritten definitions into the root container

use crate::model::MergedTree;
use std::path::PathBuf;
use tracing::debug;
use xsdoc_ir::{Node, XSD_NAMESPACE};

/// Top-level constructs of imported documents that are not merged
const SKIPPED_TAGS: &[&str] = &["annotation", "include", "import", "redefine", "override"];

/// Builds the [`MergedTree`] one document at a time
///
/// The root container keeps all of its content. Documents appended later
/// contribute only their top-level schema components, in source order;
/// their annotations, comments and include/import statements are dropped.
/// Identically named definitions are not deduplicated.
#[derive(Debug)]
pub struct MergeAssembler {
    tree: MergedTree,
}

impl MergeAssembler {
    /// Start from the root document's rewritten container
    #[must_use]
    pub fn new(root: Node, root_path: PathBuf) -> Self {
        Self {
            tree: MergedTree {
                schema: root,
                sources: vec![root_path.clone()],
                root_path,
            },
        }
    }

    /// Append the top-level definitions of a rewritten document
    ///
    /// Returns the number of nodes appended.
    pub fn append(&mut self, container: Node, source: PathBuf) -> usize {
        let before = self.tree.schema.children.len();

        for node in container.children.into_iter().filter(is_mergeable) {
            self.tree.schema.add_child(node);
        }

        let appended = self.tree.schema.children.len() - before;
        debug!(source = %source.display(), appended, "Appended definitions");
        self.tree.sources.push(source);
        appended
    }

    /// The tree built so far
    #[must_use]
    pub fn tree(&self) -> &MergedTree {
        &self.tree
    }

    /// Finish assembly
    #[must_use]
    pub fn finish(self) -> MergedTree {
        self.tree
    }
}

fn is_mergeable(node: &Node) -> bool {
    node.is_element()
        && node.namespace.as_deref() == Some(XSD_NAMESPACE)
        && !SKIPPED_TAGS.contains(&node.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_container() -> Node {
        Node::xsd("schema")
            .with_child(Node::xsd("annotation"))
            .with_child(Node::xsd("import").with_attribute("namespace", "urn:tec"))
            .with_child(Node::xsd("complexType").with_attribute("name", "Root"))
    }

    fn imported_container() -> Node {
        Node::xsd("schema")
            .with_child(Node::comment("generated"))
            .with_child(Node::xsd("annotation"))
            .with_child(Node::xsd("import").with_attribute("namespace", "urn:mmc"))
            .with_child(Node::xsd("complexType").with_attribute("name", "tec:Wrapper"))
            .with_child(Node::xsd("element").with_attribute("name", "tec:Note"))
            .with_child(Node::xsd("attributeGroup").with_attribute("name", "tec:Common"))
    }

    #[test]
    fn test_root_content_kept() {
        let assembler = MergeAssembler::new(root_container(), PathBuf::from("sfw.xsd"));
        let tree = assembler.finish();

        assert_eq!(tree.schema.children.len(), 3);
        assert_eq!(tree.sources, vec![PathBuf::from("sfw.xsd")]);
        assert_eq!(tree.definitions().count(), 1);
    }

    #[test]
    fn test_append_definitions_only() {
        let mut assembler = MergeAssembler::new(root_container(), PathBuf::from("sfw.xsd"));
        let appended = assembler.append(imported_container(), PathBuf::from("tec.xsd"));
        assert_eq!(appended, 3);

        let tree = assembler.finish();
        let names: Vec<_> = tree
            .definitions()
            .filter_map(|n| n.attribute("name"))
            .collect();
        assert_eq!(names, vec!["Root", "tec:Wrapper", "tec:Note", "tec:Common"]);
        assert_eq!(tree.schema.find_children("annotation").len(), 1);
        assert_eq!(tree.schema.find_children("import").len(), 1);
        assert_eq!(tree.sources.len(), 2);
    }

    #[test]
    fn test_no_deduplication() {
        let mut assembler = MergeAssembler::new(Node::xsd("schema"), PathBuf::from("r.xsd"));
        let twin = || {
            Node::xsd("schema").with_child(Node::xsd("simpleType").with_attribute("name", "Code"))
        };
        assembler.append(twin(), PathBuf::from("a.xsd"));
        assembler.append(twin(), PathBuf::from("b.xsd"));

        assert_eq!(assembler.tree().definitions().count(), 2);
    }
}
