//! Immutable values for outputs and locals
//!
//! Output and local values are opaque to the state engine: it stores and
//! returns them but never inspects their structure. [`Value`] is immutable
//! by construction, so the synchronized facade hands it out without deep
//! copying — cloning only bumps a reference count.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// An immutable, cheaply-clonable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(Arc<serde_json::Value>);

impl Value {
    /// Wrap a JSON value
    #[inline]
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(Arc::new(value))
    }

    /// The null value
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::new(serde_json::Value::Null)
    }

    /// String value
    #[inline]
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::new(serde_json::Value::String(s.into()))
    }

    /// Borrow the underlying JSON value
    #[inline]
    #[must_use]
    pub fn json(&self) -> &serde_json::Value {
        &self.0
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}
