//! Resolver configuration options

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default cap on the size of one schema file
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for loading and merging schemas
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Canonical prefix for the XML Schema namespace in the merged tree (default: `xsd`)
    pub builtin_prefix: String,
    /// Largest accepted schema file in bytes (default: 16 MiB)
    pub max_document_size: usize,
    /// Whether schema files may carry a DTD (default: true)
    pub allow_dtd: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            builtin_prefix: "xsd".to_string(),
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            allow_dtd: true,
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canonical builtin prefix
    #[must_use]
    pub fn builtin_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.builtin_prefix = prefix.into();
        self
    }

    /// Set the maximum document size
    #[must_use]
    pub fn max_document_size(mut self, bytes: usize) -> Self {
        self.max_document_size = bytes;
        self
    }

    /// Allow or reject DTDs
    #[must_use]
    pub fn allow_dtd(mut self, allow: bool) -> Self {
        self.allow_dtd = allow;
        self
    }

    /// Load configuration from a YAML (`.yaml`/`.yml`) or JSON file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read and [`Error::Config`]
    /// when it does not parse or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml");
        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("YAML parse error: {e}")))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("JSON parse error: {e}")))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check option values for consistency
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty or non-name builtin prefix or a zero size cap.
    pub fn validate(&self) -> Result<()> {
        let prefix_ok = self
            .builtin_prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && self
                .builtin_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !prefix_ok {
            return Err(Error::Config(format!(
                "builtin_prefix '{}' is not a valid prefix",
                self.builtin_prefix
            )));
        }
        if self.max_document_size == 0 {
            return Err(Error::Config(
                "max_document_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
