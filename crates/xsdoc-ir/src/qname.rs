//! Prefixed and unprefixed names as they appear in `name`, `ref` and `type` values

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Separator between a prefix and a local name
pub const PREFIX_SEPARATOR: char = ':';

/// A possibly prefixed name
///
/// Values that cannot be split into a non-empty prefix and a non-empty local
/// part (`":a"`, `"a:"`) are kept whole as [`Name::Unprefixed`], so parsing
/// and formatting never lose characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Name {
    /// A bare local name
    Unprefixed(String),

    /// A `prefix:local` name
    Prefixed {
        /// Prefix part
        prefix: String,
        /// Local part
        local: String,
    },
}

impl Name {
    /// Split a raw attribute value on the first separator
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(PREFIX_SEPARATOR) {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => Self::Prefixed {
                prefix: prefix.to_string(),
                local: local.to_string(),
            },
            _ => Self::Unprefixed(raw.to_string()),
        }
    }

    /// Build a name from an optional prefix and a local part
    #[must_use]
    pub fn with_prefix(prefix: Option<&str>, local: impl Into<String>) -> Self {
        match prefix {
            Some(prefix) if !prefix.is_empty() => Self::Prefixed {
                prefix: prefix.to_string(),
                local: local.into(),
            },
            _ => Self::Unprefixed(local.into()),
        }
    }

    /// The prefix, if any
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        match self {
            Self::Unprefixed(_) => None,
            Self::Prefixed { prefix, .. } => Some(prefix),
        }
    }

    /// The local part
    #[must_use]
    pub fn local(&self) -> &str {
        match self {
            Self::Unprefixed(local) | Self::Prefixed { local, .. } => local,
        }
    }

    /// Whether the name carries a prefix
    #[must_use]
    pub fn is_prefixed(&self) -> bool {
        matches!(self, Self::Prefixed { .. })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unprefixed(local) => f.write_str(local),
            Self::Prefixed { prefix, local } => write!(f, "{prefix}{PREFIX_SEPARATOR}{local}"),
        }
    }
}

impl FromStr for Name {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
