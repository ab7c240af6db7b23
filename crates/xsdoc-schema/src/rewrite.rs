//! Reference rewriter: puts every name and reference under its global prefix

use crate::events::ResolutionEvent;
use crate::model::{DefinitionCategory, RootContext};
use crate::registry::{derive_base_prefix, NamespaceRegistry};
use tracing::trace;
use xsdoc_ir::traversal::for_each_element_mut;
use xsdoc_ir::{Name, NamespaceMap, Node, SchemaDocument, XML_NAMESPACE, XSD_NAMESPACE};

/// Attributes whose value is a single qualified name
const REFERENCE_ATTRIBUTES: &[&str] = &["ref", "type", "base", "substitutionGroup", "itemType"];

/// Attribute holding a whitespace-separated list of qualified names
const MEMBER_TYPES: &str = "memberTypes";

/// Lexical scope of the document being rewritten
struct Scope<'d> {
    namespaces: &'d NamespaceMap,
    owner: Option<&'d str>,
    document: &'d str,
}

/// Rewrites copies of schema documents so that every definition name and
/// reference uses the prefix chosen for its namespace in this run
///
/// Prefixes are only meaningful inside the document that declares them, so
/// each value is first resolved to a namespace URI through the owning
/// document's own declarations and then qualified again:
///
/// - the schema-language namespace gets the canonical builtin prefix;
/// - the root's target namespace gets `root_prefix`, or no prefix at all;
/// - any other namespace gets its registry prefix, derived on first use.
///
/// Source documents are never modified.
pub struct ReferenceRewriter<'a> {
    registry: &'a mut NamespaceRegistry,
    root: &'a RootContext,
    builtin_prefix: &'a str,
    events: &'a mut Vec<ResolutionEvent>,
}

impl<'a> ReferenceRewriter<'a> {
    /// Create a rewriter that records derived prefixes and problems into `events`
    pub fn new(
        registry: &'a mut NamespaceRegistry,
        root: &'a RootContext,
        builtin_prefix: &'a str,
        events: &'a mut Vec<ResolutionEvent>,
    ) -> Self {
        Self {
            registry,
            root,
            builtin_prefix,
            events,
        }
    }

    /// Return a rewritten copy of the document's `schema` container
    ///
    /// `owner` is the namespace the document's definitions belong to: its
    /// `targetNamespace`, or the one it adopts as a chameleon include.
    pub fn rewrite_document(&mut self, document: &SchemaDocument, owner: Option<&str>) -> Node {
        let scope = Scope {
            namespaces: &document.namespaces,
            owner,
            document: document.source(),
        };
        trace!(
            document = scope.document,
            owner = owner.unwrap_or(""),
            "Rewriting document"
        );

        let mut container = document.root.clone();

        for definition in container.children.iter_mut().filter(|c| is_definition(c)) {
            if let Some(name) = definition.attribute("name") {
                let local = Name::parse(name).local().to_string();
                let qualified = self.qualify(owner, &local);
                definition.set_attribute("name", qualified.to_string());
            }
        }

        for_each_element_mut(&mut container, &mut |node: &mut Node| {
            self.rewrite_references(node, &scope);
        });

        container
    }

    /// The merged-tree form of `local` in `namespace`
    pub fn qualify(&mut self, namespace: Option<&str>, local: &str) -> Name {
        match namespace {
            Some(XSD_NAMESPACE) => Name::with_prefix(Some(self.builtin_prefix), local),
            Some(XML_NAMESPACE) => Name::with_prefix(Some("xml"), local),
            ns if self.root.is_root_namespace(ns) => {
                Name::with_prefix(self.root.root_prefix.as_deref(), local)
            }
            None => Name::Unprefixed(local.to_string()),
            Some(uri) => {
                let prefix = self.prefix_for(uri);
                Name::with_prefix(Some(&prefix), local)
            }
        }
    }

    fn rewrite_references(&mut self, node: &mut Node, scope: &Scope<'_>) {
        if node.namespace.as_deref() != Some(XSD_NAMESPACE) {
            return;
        }

        for attr in node.attributes.iter_mut().filter(|a| a.namespace.is_none()) {
            if REFERENCE_ATTRIBUTES.contains(&attr.name.as_str()) {
                attr.value = self.rewrite_value(&attr.value, scope);
            } else if attr.name == MEMBER_TYPES {
                let members: Vec<String> = attr
                    .value
                    .split_whitespace()
                    .map(|token| self.rewrite_value(token, scope))
                    .collect();
                attr.value = members.join(" ");
            }
        }
    }

    fn rewrite_value(&mut self, value: &str, scope: &Scope<'_>) -> String {
        let value = value.trim();
        match Name::parse(value) {
            Name::Prefixed { prefix, local } => match scope.namespaces.lookup(Some(&prefix)) {
                Some(uri) => self.qualify(Some(uri), &local).to_string(),
                // An undeclared canonical prefix still means the schema language
                None if prefix == self.builtin_prefix => {
                    self.qualify(Some(XSD_NAMESPACE), &local).to_string()
                }
                None => {
                    self.record(ResolutionEvent::UnknownPrefix {
                        document: scope.document.to_string(),
                        value: value.to_string(),
                    });
                    value.to_string()
                }
            },
            Name::Unprefixed(local) => {
                let namespace = scope.namespaces.default_namespace().or(scope.owner);
                self.qualify(namespace, &local).to_string()
            }
        }
    }

    fn prefix_for(&mut self, uri: &str) -> String {
        if let Some(prefix) = self.registry.resolve(uri) {
            return prefix.to_string();
        }

        let prefix = self.registry.derive(uri);
        self.record(ResolutionEvent::PrefixDerived {
            uri: uri.to_string(),
            prefix: prefix.clone(),
        });

        let requested = derive_base_prefix(uri);
        if requested != prefix {
            self.record(ResolutionEvent::PrefixCollisionResolved {
                uri: uri.to_string(),
                requested,
                assigned: prefix.clone(),
            });
        }

        prefix
    }

    fn record(&mut self, event: ResolutionEvent) {
        event.trace();
        self.events.push(event);
    }
}

/// Whether a top-level node is a named schema definition
pub(crate) fn is_definition(node: &Node) -> bool {
    node.namespace.as_deref() == Some(XSD_NAMESPACE)
        && DefinitionCategory::from_tag(&node.name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SchemaLoader;
    use std::path::Path;

    const TEC: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns="urn:tec" xmlns:m="urn:mmc" targetNamespace="urn:tec">
  <xs:import namespace="urn:mmc" schemaLocation="mmc.xsd"/>
  <xs:complexType name="Wrapper">
    <xs:sequence>
      <xs:element name="item" type="m:Container"/>
      <xs:element name="label" type="xs:string"/>
      <xs:element ref="Note"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="Note" type="xs:string"/>
  <xs:simpleType name="Codes">
    <xs:list itemType="Code"/>
  </xs:simpleType>
  <xs:simpleType name="Mixed">
    <xs:union memberTypes="Code  m:Size xs:int"/>
  </xs:simpleType>
</xs:schema>"#;

    fn parse(content: &str) -> SchemaDocument {
        SchemaLoader::default()
            .load_from_str(content, Path::new("tec.xsd"))
            .unwrap()
    }

    fn root(target_namespace: &str, root_prefix: Option<&str>) -> RootContext {
        RootContext {
            target_namespace: Some(target_namespace.to_string()),
            root_prefix: root_prefix.map(str::to_string),
        }
    }

    fn rewrite(
        doc: &SchemaDocument,
        registry: &mut NamespaceRegistry,
        ctx: &RootContext,
    ) -> (Node, Vec<ResolutionEvent>) {
        let mut events = Vec::new();
        let node = ReferenceRewriter::new(registry, ctx, "xsd", &mut events)
            .rewrite_document(doc, doc.target_namespace.as_deref());
        (node, events)
    }

    fn definition<'n>(container: &'n Node, name: &str) -> &'n Node {
        container
            .elements()
            .find(|n| n.attribute("name") == Some(name))
            .unwrap_or_else(|| panic!("no definition named {name}"))
    }

    #[test]
    fn test_foreign_document_gets_registry_prefixes() {
        let doc = parse(TEC);
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("urn:mmc", "mmc");
        let ctx = root("urn:sfw", None);

        let (merged, events) = rewrite(&doc, &mut registry, &ctx);

        let wrapper = definition(&merged, "tec:Wrapper");
        let sequence = &wrapper.children[0];
        // borrowed prefix `m` replaced by the global `mmc`
        assert_eq!(sequence.children[0].attribute("type"), Some("mmc:Container"));
        assert_eq!(sequence.children[1].attribute("type"), Some("xsd:string"));
        assert_eq!(sequence.children[2].attribute("ref"), Some("tec:Note"));
        // local element names are not definitions
        assert_eq!(sequence.children[0].attribute("name"), Some("item"));

        assert_eq!(
            events,
            vec![ResolutionEvent::PrefixDerived {
                uri: "urn:tec".to_string(),
                prefix: "tec".to_string(),
            }]
        );
    }

    #[test]
    fn test_root_namespace_stays_unprefixed() {
        let doc = parse(TEC);
        let mut registry = NamespaceRegistry::new("xsd");
        let ctx = root("urn:tec", None);

        let (merged, _) = rewrite(&doc, &mut registry, &ctx);

        let wrapper = definition(&merged, "Wrapper");
        assert_eq!(wrapper.children[0].children[2].attribute("ref"), Some("Note"));
        assert!(registry.resolve("urn:tec").is_none());
    }

    #[test]
    fn test_root_prefix_applied() {
        let doc = parse(TEC);
        let mut registry = NamespaceRegistry::new("xsd");
        let ctx = root("urn:tec", Some("t"));

        let (merged, _) = rewrite(&doc, &mut registry, &ctx);

        assert!(merged.elements().any(|n| n.attribute("name") == Some("t:Wrapper")));
        assert!(merged.elements().any(|n| n.attribute("name") == Some("t:Note")));
    }

    #[test]
    fn test_list_and_union_members() {
        let doc = parse(TEC);
        let mut registry = NamespaceRegistry::new("xsd");
        let ctx = root("urn:tec", None);

        let (merged, events) = rewrite(&doc, &mut registry, &ctx);

        let list = &definition(&merged, "Codes").children[0];
        assert_eq!(list.attribute("itemType"), Some("Code"));

        let union = &definition(&merged, "Mixed").children[0];
        assert_eq!(union.attribute("memberTypes"), Some("Code mmc:Size xsd:int"));
        assert!(events.contains(&ResolutionEvent::PrefixDerived {
            uri: "urn:mmc".to_string(),
            prefix: "mmc".to_string(),
        }));
    }

    #[test]
    fn test_derived_prefix_collision_reported() {
        let doc = parse(TEC);
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("urn:other-tec", "tec");
        registry.register("urn:mmc", "mmc");
        let ctx = root("urn:sfw", None);

        let (merged, events) = rewrite(&doc, &mut registry, &ctx);

        assert!(merged.elements().any(|n| n.attribute("name") == Some("tec2:Wrapper")));
        assert!(events.contains(&ResolutionEvent::PrefixCollisionResolved {
            uri: "urn:tec".to_string(),
            requested: "tec".to_string(),
            assigned: "tec2".to_string(),
        }));
    }

    #[test]
    fn test_unknown_prefix_kept_verbatim() {
        let doc = parse(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a" type="nope:Thing"/>
  <xs:element name="b" type="xsd:decimal"/>
</xs:schema>"#,
        );
        let mut registry = NamespaceRegistry::new("xsd");
        let ctx = RootContext::default();

        let (merged, events) = rewrite(&doc, &mut registry, &ctx);

        assert_eq!(definition(&merged, "a").attribute("type"), Some("nope:Thing"));
        assert_eq!(definition(&merged, "b").attribute("type"), Some("xsd:decimal"));
        assert_eq!(
            events,
            vec![ResolutionEvent::UnknownPrefix {
                document: "tec.xsd".to_string(),
                value: "nope:Thing".to_string(),
            }]
        );
    }

    #[test]
    fn test_source_document_untouched() {
        let doc = parse(TEC);
        let mut registry = NamespaceRegistry::new("xsd");
        let ctx = root("urn:sfw", None);

        let _ = rewrite(&doc, &mut registry, &ctx);

        assert!(doc.top_level().any(|n| n.attribute("name") == Some("Wrapper")));
    }

    #[test]
    fn test_qualify_builtin_and_xml() {
        let mut registry = NamespaceRegistry::new("xsd");
        let ctx = RootContext::default();
        let mut events = Vec::new();
        let mut rewriter = ReferenceRewriter::new(&mut registry, &ctx, "xsd", &mut events);

        assert_eq!(rewriter.qualify(Some(XSD_NAMESPACE), "int").to_string(), "xsd:int");
        assert_eq!(rewriter.qualify(Some(XML_NAMESPACE), "lang").to_string(), "xml:lang");
        assert_eq!(rewriter.qualify(None, "Local").to_string(), "Local");
    }
}
