//! Resource instances and deposed generation tracking
//!
//! One resource instance holds at most one "current" generation object and
//! any number of deposed generations, each named by a [`DeposedKey`]. A
//! deposed generation is real infrastructure that has been superseded by a
//! newer current object (create-before-destroy replacement) and is awaiting
//! destruction.

use crate::object::ResourceInstanceObject;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Unique identifier of one deposed generation within its instance
///
/// Eight lowercase hex digits. Keys are never reused while the object they
/// name still exists; allocation retries until it finds a key not already
/// present on the instance. "Not deposed" is represented as the absence of
/// a key (`Option<DeposedKey>`), not as a sentinel value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeposedKey(String);

impl DeposedKey {
    /// Generate a random key
    ///
    /// Collision-freedom against a particular instance is the caller's
    /// concern; use [`ResourceInstance::unused_deposed_key`] when writing
    /// into an instance's deposed set.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{:08x}", rand::random::<u32>()))
    }

    /// Parse a key previously produced by this type, e.g. when reloading
    /// objects recorded by an earlier run
    ///
    /// # Errors
    /// Returns [`InvalidDeposedKey`] unless the input is exactly eight
    /// lowercase hex digits.
    pub fn parse(s: &str) -> Result<Self, InvalidDeposedKey> {
        if s.len() == 8 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidDeposedKey(s.to_string()))
        }
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeposedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error for deposed key strings that are not eight lowercase hex digits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid deposed key: {0} (expected 8 lowercase hex digits)")]
pub struct InvalidDeposedKey(pub String);

/// Selects which generation of an instance to read
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// The current generation
    Current,
    /// The deposed generation with the given key
    Deposed(DeposedKey),
}

/// State of one concrete resource instance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceInstance {
    /// The current generation object, if any
    pub current: Option<ResourceInstanceObject>,
    /// Deposed generation objects by key
    pub deposed: IndexMap<DeposedKey, ResourceInstanceObject>,
}

impl ResourceInstance {
    /// Empty instance record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a current generation object exists
    #[inline]
    #[must_use]
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Whether any generation object exists at all
    ///
    /// An instance for which this is false must not persist in the tree.
    #[inline]
    #[must_use]
    pub fn has_objects(&self) -> bool {
        self.current.is_some() || !self.deposed.is_empty()
    }

    /// Look up one generation
    #[must_use]
    pub fn object(&self, gen: &Generation) -> Option<&ResourceInstanceObject> {
        match gen {
            Generation::Current => self.current.as_ref(),
            Generation::Deposed(key) => self.deposed.get(key),
        }
    }

    /// Allocate a deposed key not already used by this instance
    #[must_use]
    pub fn unused_deposed_key(&self) -> DeposedKey {
        loop {
            let key = DeposedKey::generate();
            if !self.deposed.contains_key(&key) {
                return key;
            }
        }
    }

    /// Move the current object (if any) into the deposed set
    ///
    /// With `forced` set, that exact key is used; otherwise a fresh
    /// collision-free key is allocated. Returns the key used, or `None`
    /// when there was no current object to depose — deposing nothing is
    /// not an error because the caller may not know whether the instance
    /// exists.
    ///
    /// # Panics
    /// Panics if `forced` names a key already present in the deposed set;
    /// that indicates a racing double-allocation upstream.
    pub fn depose_current(&mut self, forced: Option<DeposedKey>) -> Option<DeposedKey> {
        let current = self.current.take()?;
        let key = match forced {
            Some(key) => {
                assert!(
                    !self.deposed.contains_key(&key),
                    "forced deposed key {key} is already in use"
                );
                key
            }
            None => self.unused_deposed_key(),
        };
        tracing::trace!(key = %key, "deposing current object");
        self.deposed.insert(key.clone(), current);
        Some(key)
    }

    /// Restore the named deposed object as current, only if no current
    /// object exists
    ///
    /// Never discards an existing current object: that object may represent
    /// real, live infrastructure. Returns whether the restore happened.
    pub fn maybe_restore_deposed(&mut self, key: &DeposedKey) -> bool {
        if self.current.is_some() || !self.deposed.contains_key(key) {
            return false;
        }
        self.current = self.deposed.shift_remove(key);
        true
    }
}
