//! Structured events reported during resolution

use crate::model::DefinitionCategory;
use serde::Serialize;
use std::fmt;

/// Something noteworthy that happened while resolving a schema
///
/// Events are collected in the [`Resolution`](crate::Resolution) so callers
/// decide how to present them; each is also emitted through `tracing` when
/// recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ResolutionEvent {
    /// A schema file was loaded and merged
    DocumentLoaded {
        path: String,
        target_namespace: Option<String>,
    },

    /// An include/import could not be loaded and was left out
    ImportSkipped { path: String, reason: String },

    /// A document's own declaration became the global prefix for a namespace
    PrefixRegistered {
        uri: String,
        prefix: String,
        document: String,
    },

    /// A prefix was synthesized because no document declared one
    PrefixDerived { uri: String, prefix: String },

    /// A proposed prefix was already taken and a different one was assigned
    PrefixCollisionResolved {
        uri: String,
        requested: String,
        assigned: String,
    },

    /// A prefixed value used a prefix its document never declared
    UnknownPrefix { document: String, value: String },

    /// The same name is defined more than once in one category
    DuplicateDefinition {
        category: DefinitionCategory,
        name: String,
    },
}

impl ResolutionEvent {
    /// Whether the event signals lost or ambiguous content
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::ImportSkipped { .. } | Self::UnknownPrefix { .. } | Self::DuplicateDefinition { .. }
        )
    }

    /// Emit the event through `tracing` at its level
    pub(crate) fn trace(&self) {
        match self {
            Self::DocumentLoaded { path, target_namespace } => {
                tracing::debug!(
                    path = %path,
                    target_namespace = target_namespace.as_deref().unwrap_or(""),
                    "Merged schema document"
                );
            }
            Self::ImportSkipped { path, reason } => {
                tracing::warn!(path = %path, reason = %reason, "Skipping import");
            }
            Self::PrefixRegistered { uri, prefix, document } => {
                tracing::debug!(uri = %uri, prefix = %prefix, document = %document, "Registered prefix");
            }
            Self::PrefixDerived { uri, prefix } => {
                tracing::info!(uri = %uri, prefix = %prefix, "Derived prefix");
            }
            Self::PrefixCollisionResolved { uri, requested, assigned } => {
                tracing::info!(
                    uri = %uri,
                    requested = %requested,
                    assigned = %assigned,
                    "Prefix already taken, disambiguated"
                );
            }
            Self::UnknownPrefix { document, value } => {
                tracing::warn!(document = %document, value = %value, "Undeclared prefix, keeping value");
            }
            Self::DuplicateDefinition { category, name } => {
                tracing::warn!(category = %category, name = %name, "Duplicate definition in merged tree");
            }
        }
    }
}

impl fmt::Display for ResolutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentLoaded { path, .. } => write!(f, "loaded {path}"),
            Self::ImportSkipped { path, reason } => write!(f, "skipped {path}: {reason}"),
            Self::PrefixRegistered { uri, prefix, .. } => write!(f, "registered {prefix} for {uri}"),
            Self::PrefixDerived { uri, prefix } => write!(f, "derived {prefix} for {uri}"),
            Self::PrefixCollisionResolved { uri, requested, assigned } => {
                write!(f, "{requested} already taken, using {assigned} for {uri}")
            }
            Self::UnknownPrefix { document, value } => {
                write!(f, "undeclared prefix in '{value}' ({document})")
            }
            Self::DuplicateDefinition { category, name } => {
                write!(f, "{category} '{name}' is defined more than once")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let event = ResolutionEvent::ImportSkipped {
            path: "missing.xsd".to_string(),
            reason: "schema file not found: missing.xsd".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "import_skipped");
        assert_eq!(json["path"], "missing.xsd");
    }

    #[test]
    fn test_warning_classification() {
        let derived = ResolutionEvent::PrefixDerived {
            uri: "urn:mmc".to_string(),
            prefix: "mmc".to_string(),
        };
        let duplicate = ResolutionEvent::DuplicateDefinition {
            category: DefinitionCategory::Type,
            name: "Container".to_string(),
        };

        assert!(!derived.is_warning());
        assert!(duplicate.is_warning());
        assert_eq!(duplicate.to_string(), "type 'Container' is defined more than once");
    }
}
