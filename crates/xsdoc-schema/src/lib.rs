//! # xsdoc-schema
//!
//! Import/include resolution and namespace-prefix unification for XML Schema.
//!
//! Starting from a root schema file, the resolver walks every `include` and
//! `import`, loads each document once, and merges their definitions into a
//! single tree in which every name and reference carries one globally
//! consistent prefix per namespace:
//!
//! loader → namespace registry → import graph walker → reference rewriter → merge assembler

pub mod config;
pub mod events;
pub mod index;
pub mod loader;
pub mod merge;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod rewrite;

pub use config::ResolverConfig;
pub use events::ResolutionEvent;
pub use index::{Definition, DefinitionIndex, Reference};
pub use loader::SchemaLoader;
pub use merge::MergeAssembler;
pub use model::{DefinitionCategory, ImportRecord, MergedTree, Resolution, RootContext};
pub use registry::{NamespaceRegistry, Registration};
pub use resolver::{resolve, ImportGraphWalker};
pub use rewrite::ReferenceRewriter;

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a single schema file could not be loaded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("schema file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("cannot read schema '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("schema '{path}' is too large: {size} bytes (max {max} bytes)")]
    TooLarge { path: PathBuf, size: usize, max: usize },

    #[error("malformed XML in '{path}': {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("'{path}' is not a schema document (root element is '{found}')")]
    NotASchema { path: PathBuf, found: String },
}

impl LoadError {
    /// Create an I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-document error for the given path
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Path of the document that failed
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::TooLarge { path, .. }
            | Self::Malformed { path, .. }
            | Self::NotASchema { path, .. } => path,
        }
    }
}

/// Errors that abort a resolution run
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load root schema: {0}")]
    RootLoad(#[source] LoadError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
