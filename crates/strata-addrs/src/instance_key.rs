//! Repetition keys for multi-instance objects
//!
//! Resources and module calls can expand into several instances via
//! count-style (integer keys) or for_each-style (string keys) repetition.
//! An object declared without repetition has [`InstanceKey::NoKey`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Key distinguishing one instance of a repeated object from its siblings
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InstanceKey {
    /// Single-instance object (no count/for_each repetition)
    NoKey,
    /// count-style integer index
    Index(i64),
    /// for_each-style string key
    Key(String),
}

impl InstanceKey {
    /// String-keyed instance
    #[inline]
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    /// Check whether this is the no-repetition key
    #[inline]
    #[must_use]
    pub fn is_no_key(&self) -> bool {
        matches!(self, Self::NoKey)
    }
}

impl Default for InstanceKey {
    fn default() -> Self {
        Self::NoKey
    }
}

impl Display for InstanceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKey => Ok(()),
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Key(k) => write!(f, "[{k:?}]"),
        }
    }
}

impl From<i64> for InstanceKey {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for InstanceKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}
