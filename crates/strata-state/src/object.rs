//! Resource instance generation objects
//!
//! A generation object is one lifecycle snapshot of a resource instance:
//! the provider-specific attribute payload plus the dependency metadata the
//! engine needs to order destroys correctly. The payload bytes are opaque
//! here; decoding them requires the owning provider's schema.

use serde::{Deserialize, Serialize};
use strata_addrs::AbsResource;

/// Lifecycle status of a generation object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectStatus {
    /// Object exists and is believed to match its configuration
    Ready,
    /// Object exists but a previous operation left it in a damaged or
    /// unknown condition, so it is queued for replacement
    Tainted,
    /// Transient placeholder created during planning; does not represent
    /// real infrastructure
    Planned,
}

/// One generation of a resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInstanceObject {
    /// Lifecycle status
    pub status: ObjectStatus,
    /// Opaque provider-specific attribute payload
    pub attrs: Vec<u8>,
    /// Resources this object depends on, used to order destroy operations
    pub dependencies: Vec<AbsResource>,
    /// Whether the object was created from a configuration that still
    /// contained unresolved partial values
    pub depends_on_partial: bool,
}

impl ResourceInstanceObject {
    /// Ready object with the given attribute payload
    #[inline]
    #[must_use]
    pub fn ready(attrs: impl Into<Vec<u8>>) -> Self {
        Self {
            status: ObjectStatus::Ready,
            attrs: attrs.into(),
            dependencies: Vec::new(),
            depends_on_partial: false,
        }
    }

    /// Planned placeholder object with the given attribute payload
    #[inline]
    #[must_use]
    pub fn planned(attrs: impl Into<Vec<u8>>) -> Self {
        Self {
            status: ObjectStatus::Planned,
            attrs: attrs.into(),
            dependencies: Vec::new(),
            depends_on_partial: false,
        }
    }

    /// Replace the dependency set
    #[inline]
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<AbsResource>) -> Self {
        self.dependencies = dependencies;
        self
    }
}
