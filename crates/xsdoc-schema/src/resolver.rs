//! Import graph walker: loads every reachable schema once and merges it

use crate::config::ResolverConfig;
use crate::events::ResolutionEvent;
use crate::index::DefinitionIndex;
use crate::loader::SchemaLoader;
use crate::merge::MergeAssembler;
use crate::model::{ImportRecord, Resolution, RootContext};
use crate::registry::{NamespaceRegistry, Registration};
use crate::rewrite::ReferenceRewriter;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use xsdoc_ir::{Node, SchemaDocument, SourceInfo, XML_NAMESPACE, XSD_NAMESPACE};

/// URL schemes that are never fetched
const REMOTE_SCHEMES: &[&str] = &["http:", "https:", "ftp:"];

/// Resolve a root schema and everything it includes or imports
///
/// # Errors
///
/// Fails only when the configuration is invalid or the root document cannot
/// be loaded. Problems with included or imported documents are reported as
/// [`ResolutionEvent::ImportSkipped`] events instead.
pub fn resolve(root_path: &Path, config: &ResolverConfig) -> Result<Resolution> {
    ImportGraphWalker::new(config.clone()).run(root_path)
}

/// How a document was referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Include,
    Import,
}

impl Directive {
    fn as_str(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Import => "import",
        }
    }
}

/// A reference waiting on the worklist
#[derive(Debug)]
struct PendingLoad {
    directive: Directive,
    location: String,
    base_dir: PathBuf,
    /// `namespace` attribute of an import
    namespace_hint: Option<String>,
    /// Owning namespace of the referencing document
    referrer_namespace: Option<String>,
}

/// Walks include/import references depth first from the root document
///
/// Owns the namespace registry, the import record and the event log for one
/// run. Each document is loaded at most once (by canonical path), its
/// namespace declarations are registered first-write-wins, its references
/// are queued, and a rewritten copy of its definitions is merged.
pub struct ImportGraphWalker {
    config: ResolverConfig,
    loader: SchemaLoader,
    registry: NamespaceRegistry,
    record: ImportRecord,
    events: Vec<ResolutionEvent>,
    worklist: Vec<PendingLoad>,
}

impl ImportGraphWalker {
    /// Create a walker for one run
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            loader: SchemaLoader::new(config.clone()),
            registry: NamespaceRegistry::new(&config.builtin_prefix),
            record: ImportRecord::new(),
            events: Vec::new(),
            worklist: Vec::new(),
            config,
        }
    }

    /// Resolve `root_path`, consuming the walker
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub fn run(mut self, root_path: &Path) -> Result<Resolution> {
        self.config.validate()?;

        let root_doc = self
            .loader
            .load(root_path)
            .map_err(Error::RootLoad)?;
        let root_doc = with_context(root_doc, "root");
        let root_key = canonical(root_path);
        self.record.insert(root_key.clone());

        let mut root = RootContext::new(root_doc.target_namespace.as_deref(), &root_doc.namespaces);
        self.seed_registry(&root_doc, &mut root);
        self.loaded(&root_doc);

        let container = self.rewrite(&root_doc, root.target_namespace.as_deref(), &root);
        let mut assembler = MergeAssembler::new(container, root_key.clone());
        self.enqueue(&root_doc, &root_key, root.target_namespace.clone());

        while let Some(pending) = self.worklist.pop() {
            let Some((doc, key)) = self.load_pending(&pending) else {
                continue;
            };
            let owner = owning_namespace(&doc, &pending);

            self.register_declarations(&doc, &root);
            self.enqueue(&doc, &key, owner.clone());
            self.loaded(&doc);

            let container = self.rewrite(&doc, owner.as_deref(), &root);
            assembler.append(container, key);
        }

        let merged = assembler.finish();
        let index = DefinitionIndex::build(&merged.schema, &self.config.builtin_prefix);
        for (category, name) in index.duplicates() {
            self.record_event(ResolutionEvent::DuplicateDefinition {
                category,
                name: name.to_string(),
            });
        }

        info!(
            root = %root_path.display(),
            documents = merged.sources.len(),
            namespaces = self.registry.len(),
            warnings = self.events.iter().filter(|e| e.is_warning()).count(),
            "Resolved schema"
        );

        Ok(Resolution {
            merged,
            root,
            namespaces: self.registry,
            events: self.events,
        })
    }

    /// Register the root's declarations; its own namespace only under `root_prefix`
    fn seed_registry(&mut self, root_doc: &SchemaDocument, root: &mut RootContext) {
        if let (Some(tns), Some(prefix)) = (root.target_namespace.clone(), root.root_prefix.clone()) {
            let assigned = self.claim(&tns, &prefix, root_doc.source());
            root.root_prefix = Some(assigned);
        }
        self.register_declarations(root_doc, root);
    }

    fn register_declarations(&mut self, doc: &SchemaDocument, root: &RootContext) {
        for decl in doc.namespaces.iter() {
            let Some(prefix) = decl.prefix.as_deref() else {
                continue;
            };
            let uri = decl.uri.as_str();
            if uri == XSD_NAMESPACE || uri == XML_NAMESPACE || root.is_root_namespace(Some(uri)) {
                continue;
            }
            self.claim(uri, prefix, doc.source());
        }
    }

    /// Register `prefix` for `uri`, disambiguating when another URI holds it
    fn claim(&mut self, uri: &str, prefix: &str, document: &str) -> String {
        match self.registry.register(uri, prefix) {
            Registration::Inserted => {
                self.record_event(ResolutionEvent::PrefixRegistered {
                    uri: uri.to_string(),
                    prefix: prefix.to_string(),
                    document: document.to_string(),
                });
                prefix.to_string()
            }
            Registration::AlreadyRegistered(existing) => existing,
            Registration::PrefixTaken { owner } => {
                debug!(
                    uri = %uri,
                    prefix = %prefix,
                    owner = owner.as_deref().unwrap_or("(reserved)"),
                    "Declared prefix already taken"
                );
                let assigned = self.registry.disambiguate(uri, prefix);
                self.record_event(ResolutionEvent::PrefixCollisionResolved {
                    uri: uri.to_string(),
                    requested: prefix.to_string(),
                    assigned: assigned.clone(),
                });
                assigned
            }
        }
    }

    /// Queue a document's include/import references so they pop in source order
    fn enqueue(&mut self, doc: &SchemaDocument, key: &Path, owner: Option<String>) {
        let base_dir = key.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut found = Vec::new();

        for node in doc.top_level() {
            let directive = if node.is_xsd("include") {
                Directive::Include
            } else if node.is_xsd("import") {
                Directive::Import
            } else {
                continue;
            };

            let Some(location) = node.attribute("schemaLocation") else {
                debug!(
                    document = doc.source(),
                    namespace = node.attribute("namespace").unwrap_or(""),
                    "{} without schemaLocation, nothing to merge",
                    directive.as_str()
                );
                continue;
            };

            found.push(PendingLoad {
                directive,
                location: location.trim().to_string(),
                base_dir: base_dir.clone(),
                namespace_hint: node.attribute("namespace").map(str::to_string),
                referrer_namespace: owner.clone(),
            });
        }

        self.worklist.extend(found.into_iter().rev());
    }

    /// Load a pending reference unless it was seen before or cannot be loaded
    fn load_pending(&mut self, pending: &PendingLoad) -> Option<(SchemaDocument, PathBuf)> {
        if is_remote(&pending.location) {
            self.record_event(ResolutionEvent::ImportSkipped {
                path: pending.location.clone(),
                reason: "remote schema locations are not fetched".to_string(),
            });
            return None;
        }

        let path = pending.base_dir.join(&pending.location);
        let key = canonical(&path);
        if !self.record.insert(key.clone()) {
            debug!(path = %key.display(), "Already resolved, skipping");
            return None;
        }

        match self.loader.load(&key) {
            Ok(doc) => Some((with_context(doc, pending.directive.as_str()), key)),
            Err(e) => {
                self.record_event(ResolutionEvent::ImportSkipped {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn rewrite(&mut self, doc: &SchemaDocument, owner: Option<&str>, root: &RootContext) -> Node {
        ReferenceRewriter::new(
            &mut self.registry,
            root,
            &self.config.builtin_prefix,
            &mut self.events,
        )
        .rewrite_document(doc, owner)
    }

    fn loaded(&mut self, doc: &SchemaDocument) {
        self.record_event(ResolutionEvent::DocumentLoaded {
            path: doc.source().to_string(),
            target_namespace: doc.target_namespace.clone(),
        });
    }

    fn record_event(&mut self, event: ResolutionEvent) {
        event.trace();
        self.events.push(event);
    }
}

/// The namespace a loaded document's definitions belong to
///
/// Its own `targetNamespace` wins. Without one, an included document takes
/// the includer's namespace and an imported one the import's `namespace`.
fn owning_namespace(doc: &SchemaDocument, pending: &PendingLoad) -> Option<String> {
    let expected = match pending.directive {
        Directive::Include => pending.referrer_namespace.as_deref(),
        Directive::Import => pending.namespace_hint.as_deref(),
    };

    match (doc.target_namespace.as_deref(), expected) {
        (Some(actual), Some(expected)) if actual != expected => {
            warn!(
                document = doc.source(),
                target_namespace = actual,
                expected,
                "{} namespace does not match targetNamespace",
                pending.directive.as_str()
            );
            Some(actual.to_string())
        }
        (Some(actual), _) => Some(actual.to_string()),
        (None, expected) => expected.map(str::to_string),
    }
}

fn with_context(doc: SchemaDocument, context: &str) -> SchemaDocument {
    let source = SourceInfo::new(doc.source()).with_context(context);
    doc.with_source(source)
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}
