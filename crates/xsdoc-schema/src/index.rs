//! Definition index over a merged schema tree

use crate::model::DefinitionCategory;
use serde::Serialize;
use std::collections::BTreeMap;
use xsdoc_ir::traversal::{walk, Traversal};
use xsdoc_ir::{Name, Node, Position, XSD_NAMESPACE};

/// A top-level definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub category: DefinitionCategory,
    pub name: String,
    /// `name` attributes from the definition outward (leaf first)
    pub path: Vec<String>,
    pub position: Option<Position>,
}

/// An attribute value that names another definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Referencing attribute (`ref`, `type`, `base`, …)
    pub attribute: String,
    /// Referenced name, one token for `memberTypes`
    pub value: String,
    /// Category the value must be defined in
    pub target: DefinitionCategory,
    /// Name path of the referencing node, leaf first
    pub path: Vec<String>,
    pub position: Option<Position>,
}

/// Lookup tables for definitions and references in one tree
#[derive(Debug, Clone, Default, Serialize)]
pub struct DefinitionIndex {
    definitions: Vec<Definition>,
    references: Vec<Reference>,
    #[serde(skip)]
    by_name: BTreeMap<(DefinitionCategory, String), Vec<usize>>,
    #[serde(skip)]
    builtin_prefix: String,
}

impl DefinitionIndex {
    /// Index the top-level definitions of `schema` and every reference below it
    ///
    /// Values carrying `builtin_prefix` (or `xml:`) name builtins and are
    /// never reported as unresolved.
    #[must_use]
    pub fn build(schema: &Node, builtin_prefix: &str) -> Self {
        let mut builder = IndexBuilder::default();
        walk(schema, &mut builder);

        let mut by_name: BTreeMap<_, Vec<usize>> = BTreeMap::new();
        for (i, def) in builder.definitions.iter().enumerate() {
            by_name
                .entry((def.category, def.name.clone()))
                .or_default()
                .push(i);
        }

        Self {
            definitions: builder.definitions,
            references: builder.references,
            by_name,
            builtin_prefix: builtin_prefix.to_string(),
        }
    }

    /// Definitions in document order
    #[must_use]
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// References in document order
    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// First definition of `name` in `category`
    #[must_use]
    pub fn get(&self, category: DefinitionCategory, name: &str) -> Option<&Definition> {
        self.by_name
            .get(&(category, name.to_string()))
            .and_then(|ids| ids.first())
            .map(|&i| &self.definitions[i])
    }

    /// Whether `name` is defined in `category`
    #[must_use]
    pub fn contains(&self, category: DefinitionCategory, name: &str) -> bool {
        self.get(category, name).is_some()
    }

    /// Every place `name` is referenced
    pub fn usages<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Reference> + 'a {
        self.references.iter().filter(move |r| r.value == name)
    }

    /// References whose target is neither defined nor builtin
    #[must_use]
    pub fn unresolved(&self) -> Vec<&Reference> {
        self.references
            .iter()
            .filter(|r| !self.is_builtin(&r.value) && !self.contains(r.target, &r.value))
            .collect()
    }

    /// Names defined more than once within one category
    #[must_use]
    pub fn duplicates(&self) -> Vec<(DefinitionCategory, &str)> {
        self.by_name
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|((category, name), _)| (*category, name.as_str()))
            .collect()
    }

    fn is_builtin(&self, value: &str) -> bool {
        matches!(Name::parse(value).prefix(), Some(p) if p == self.builtin_prefix || p == "xml")
    }
}

/// Collects definitions and references while walking the tree
#[derive(Default)]
struct IndexBuilder {
    definitions: Vec<Definition>,
    references: Vec<Reference>,
    /// `name` of each open ancestor
    names: Vec<Option<String>>,
}

impl IndexBuilder {
    fn name_path(&self, node: &Node) -> Vec<String> {
        node.attribute("name")
            .into_iter()
            .map(str::to_string)
            .chain(self.names.iter().rev().flatten().cloned())
            .collect()
    }

    fn push_reference(&mut self, node: &Node, attribute: &str, value: &str, target: DefinitionCategory) {
        self.references.push(Reference {
            attribute: attribute.to_string(),
            value: value.to_string(),
            target,
            path: self.name_path(node),
            position: node.position,
        });
    }
}

impl Traversal for IndexBuilder {
    fn visit(&mut self, node: &Node, path: &[String]) {
        if !node.is_element() || node.namespace.as_deref() != Some(XSD_NAMESPACE) {
            return;
        }

        // path holds the ancestors, so the schema's own children sit at depth 1
        if path.len() == 1 {
            if let (Some(category), Some(name)) =
                (DefinitionCategory::from_tag(&node.name), node.attribute("name"))
            {
                self.definitions.push(Definition {
                    category,
                    name: name.to_string(),
                    path: self.name_path(node),
                    position: node.position,
                });
            }
        }

        for attr in node.attributes.iter().filter(|a| a.namespace.is_none()) {
            let target = match attr.name.as_str() {
                "ref" => DefinitionCategory::from_tag(&node.name),
                "type" | "base" | "itemType" | "memberTypes" => Some(DefinitionCategory::Type),
                "substitutionGroup" => Some(DefinitionCategory::Element),
                _ => None,
            };
            let Some(target) = target else { continue };

            if attr.name == "memberTypes" {
                for token in attr.value.split_whitespace() {
                    self.push_reference(node, &attr.name, token, target);
                }
            } else {
                self.push_reference(node, &attr.name, attr.value.trim(), target);
            }
        }
    }

    fn enter(&mut self, node: &Node, _path: &[String]) {
        self.names.push(node.attribute("name").map(str::to_string));
    }

    fn leave(&mut self, _node: &Node, _path: &[String]) {
        self.names.pop();
    }
}
