//! Namespace registry: one global prefix per namespace URI

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Prefix used when a URI yields nothing usable
const FALLBACK_PREFIX: &str = "ns";

/// Path segments that are only a version, such as `1.0`, `v2` or `2019-04`
static VERSION_SEGMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[vV]?\d+(?:[._-]\d+)*$").ok());

/// Trailing version markers on a name, such as `-2`, `V3` or `12`
static VERSION_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[-_.]?[vV]?\d+$").ok());

/// Outcome of [`NamespaceRegistry::register`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The URI was new and now maps to the proposed prefix
    Inserted,
    /// The URI already had a prefix; the proposal was ignored
    AlreadyRegistered(String),
    /// The prefix already names another URI (or is reserved); the proposal was ignored
    PrefixTaken { owner: Option<String> },
}

/// Global mapping from namespace URI to its chosen prefix for one run
///
/// First writer wins: once a URI has a prefix it never changes. Prefixes are
/// unique across URIs, so a declaration reusing a prefix already bound to a
/// different URI is refused by [`register`] and resolved through
/// [`disambiguate`].
///
/// [`register`]: NamespaceRegistry::register
/// [`disambiguate`]: NamespaceRegistry::disambiguate
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceRegistry {
    #[serde(rename = "namespaces")]
    by_uri: BTreeMap<String, String>,
    #[serde(skip)]
    by_prefix: BTreeMap<String, String>,
    #[serde(skip)]
    reserved: Vec<String>,
}

impl NamespaceRegistry {
    /// Create an empty registry, reserving the builtin prefix and the `xml`/`xmlns` prefixes
    #[must_use]
    pub fn new(builtin_prefix: &str) -> Self {
        Self {
            by_uri: BTreeMap::new(),
            by_prefix: BTreeMap::new(),
            reserved: vec![
                builtin_prefix.to_string(),
                "xml".to_string(),
                "xmlns".to_string(),
            ],
        }
    }

    /// Propose `prefix` for `uri`
    ///
    /// Inserts only when the URI is unknown and the prefix is free; never
    /// overwrites.
    pub fn register(&mut self, uri: &str, prefix: &str) -> Registration {
        if let Some(existing) = self.by_uri.get(uri) {
            return Registration::AlreadyRegistered(existing.clone());
        }
        if self.reserved.iter().any(|r| r == prefix) {
            return Registration::PrefixTaken { owner: None };
        }
        if let Some(owner) = self.by_prefix.get(prefix) {
            return Registration::PrefixTaken {
                owner: Some(owner.clone()),
            };
        }
        self.insert(uri, prefix.to_string());
        Registration::Inserted
    }

    /// The prefix registered for `uri`
    #[must_use]
    pub fn resolve(&self, uri: &str) -> Option<&str> {
        self.by_uri.get(uri).map(String::as_str)
    }

    /// The URI a prefix is bound to
    #[must_use]
    pub fn namespace_for(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Synthesize, register and return a prefix for `uri`
    ///
    /// Idempotent: a URI that already has a prefix (declared or derived)
    /// returns it unchanged. Otherwise the prefix comes from
    /// [`derive_base_prefix`], with `2`, `3`, … appended while the candidate
    /// is taken.
    pub fn derive(&mut self, uri: &str) -> String {
        if let Some(existing) = self.resolve(uri) {
            return existing.to_string();
        }

        self.disambiguate(uri, &derive_base_prefix(uri))
    }

    /// Register `uri` under `requested`, or under `requested` plus the first
    /// free counter (`2`, `3`, …) when that prefix is taken
    ///
    /// A URI that already has a prefix keeps it.
    pub fn disambiguate(&mut self, uri: &str, requested: &str) -> String {
        if let Some(existing) = self.resolve(uri) {
            return existing.to_string();
        }

        let mut candidate = requested.to_string();
        let mut counter = 2;
        while self.is_taken(&candidate) {
            candidate = format!("{requested}{counter}");
            counter += 1;
        }

        self.insert(uri, candidate.clone());
        candidate
    }

    /// Whether `prefix` is reserved or bound to any URI
    #[must_use]
    pub fn is_taken(&self, prefix: &str) -> bool {
        self.by_prefix.contains_key(prefix) || self.reserved.iter().any(|r| r == prefix)
    }

    /// `(uri, prefix)` pairs ordered by URI
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_uri.iter().map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Number of registered namespaces
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_uri.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_uri.is_empty()
    }

    fn insert(&mut self, uri: &str, prefix: String) {
        self.by_prefix.insert(prefix.clone(), uri.to_string());
        self.by_uri.insert(uri.to_string(), prefix);
    }
}

/// Heuristic prefix for a namespace URI, before collision handling
///
/// 1. Split the URI on `/`, `:` and `#`, and take the last non-empty segment
///    that is not just a version (`1.0`, `v2`).
/// 2. Cut it at the first `_` and then at the first `.`
///    (`TEC_3_4` → `TEC`, `tec.xsd` → `tec`).
/// 3. Strip one trailing version marker (`CommonBasicComponents-2`, `TEC3`).
/// 4. Lower-case and keep name characters; anything unusable yields `ns`.
#[must_use]
pub fn derive_base_prefix(uri: &str) -> String {
    let segments: Vec<&str> = uri.split(['/', ':', '#']).filter(|s| !s.is_empty()).collect();
    let segment = segments
        .iter()
        .rev()
        .find(|s| !is_version_segment(s))
        .copied()
        .unwrap_or_default();

    let head = segment.split('_').next().unwrap_or_default();
    let head = head.split('.').next().unwrap_or_default();
    let head = match VERSION_SUFFIX.as_ref() {
        Some(re) => re.replace(head, ""),
        None => head.into(),
    };

    let prefix: String = head
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if prefix.starts_with(|c: char| c.is_ascii_alphabetic()) {
        prefix
    } else {
        FALLBACK_PREFIX.to_string()
    }
}

fn is_version_segment(segment: &str) -> bool {
    VERSION_SEGMENT
        .as_ref()
        .is_some_and(|re| re.is_match(segment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut registry = NamespaceRegistry::new("xsd");

        assert_eq!(registry.register("urn:x", "a"), Registration::Inserted);
        assert_eq!(
            registry.register("urn:x", "b"),
            Registration::AlreadyRegistered("a".to_string())
        );
        assert_eq!(registry.resolve("urn:x"), Some("a"));
        assert_eq!(registry.namespace_for("b"), None);
    }

    #[test]
    fn test_prefix_owned_by_other_uri_is_rejected() {
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("http://example.com/d", "shared");

        assert_eq!(
            registry.register("http://example.com/e", "shared"),
            Registration::PrefixTaken {
                owner: Some("http://example.com/d".to_string())
            }
        );
        assert_eq!(registry.resolve("http://example.com/e"), None);
    }

    #[test]
    fn test_reserved_prefixes_rejected() {
        let mut registry = NamespaceRegistry::new("xsd");
        assert_eq!(
            registry.register("urn:odd", "xsd"),
            Registration::PrefixTaken { owner: None }
        );
        assert_eq!(
            registry.register("urn:odd", "xml"),
            Registration::PrefixTaken { owner: None }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_derive_is_idempotent() {
        let mut registry = NamespaceRegistry::new("xsd");
        let first = registry.derive("http://example.com/TEC_3_4");
        let second = registry.derive("http://example.com/TEC_3_4");

        assert_eq!(first, "tec");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_derive_returns_declared_prefix() {
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("urn:mmc", "m");
        assert_eq!(registry.derive("urn:mmc"), "m");
    }

    #[test]
    fn test_derive_appends_counter_on_collision() {
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("http://other.org/tec", "tec");

        assert_eq!(registry.derive("http://example.com/TEC_3_4"), "tec2");
        assert_eq!(registry.derive("http://example.com/tec/2.0"), "tec3");
        assert_eq!(registry.resolve("http://example.com/TEC_3_4"), Some("tec2"));
    }

    #[test]
    fn test_disambiguate_declared_prefix() {
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("http://example.com/d", "shared");

        assert_eq!(registry.disambiguate("http://example.com/e", "shared"), "shared2");
        assert_eq!(registry.disambiguate("http://example.com/e", "other"), "shared2");
        assert_eq!(registry.namespace_for("shared2"), Some("http://example.com/e"));
    }

    #[test]
    fn test_derive_avoids_builtin_prefix() {
        let mut registry = NamespaceRegistry::new("xsd");
        assert_eq!(registry.derive("urn:xsd"), "xsd2");
    }

    #[test]
    fn test_derive_base_prefix_heuristic() {
        let cases = [
            ("http://example.com/SomeModule_1_2", "somemodule"),
            ("http://example.com/TEC_3_4", "tec"),
            ("urn:mmc", "mmc"),
            ("http://example.com/tec/1.0", "tec"),
            ("http://example.com/ns/v2/", "ns"),
            ("http://www.w3.org/1999/xhtml", "xhtml"),
            ("http://example.com/schemas/tec.xsd", "tec"),
            (
                "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2",
                "commonbasiccomponents",
            ),
            ("http://example.com/TEC3", "tec"),
            ("http://example.com/", "example"),
            ("", "ns"),
            ("urn:2019", "urn"),
            ("http://example.com/_private", "ns"),
        ];

        for (uri, expected) in cases {
            assert_eq!(derive_base_prefix(uri), expected, "uri: {uri}");
        }
    }

    #[test]
    fn test_iter_sorted_by_uri() {
        let mut registry = NamespaceRegistry::new("xsd");
        registry.register("urn:z", "z");
        registry.register("urn:a", "a");

        let entries: Vec<_> = registry.iter().collect();
        assert_eq!(entries, vec![("urn:a", "a"), ("urn:z", "z")]);
    }
}
