//! Module instance addresses
//!
//! A module instance is one concrete instantiation of a configuration
//! module: a path of module-call steps from the root, each step optionally
//! carrying a repetition key. The root module is the empty path.

use crate::instance_key::InstanceKey;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One step in a module instance path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleInstanceStep {
    /// Name of the module call
    pub name: String,
    /// Repetition key of this instantiation
    pub key: InstanceKey,
}

impl Display for ModuleInstanceStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "module.{}{}", self.name, self.key)
    }
}

/// A module call as declared in configuration, without a repetition key
///
/// Used to select all instances of one call, e.g. when collecting every
/// instance's output values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleCall {
    /// Name of the module call
    pub name: String,
}

impl ModuleCall {
    /// Create a module call address
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for ModuleCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "module.{}", self.name)
    }
}

/// Address of one instantiated module
///
/// The root module is the empty path and always exists; every other
/// instance is addressed by the chain of calls that produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ModuleInstance(Vec<ModuleInstanceStep>);

impl ModuleInstance {
    /// The root module instance (empty path)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Check whether this is the root module instance
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path steps from root to this instance
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[ModuleInstanceStep] {
        &self.0
    }

    /// Append a child call step, returning the child instance address
    #[inline]
    #[must_use]
    pub fn child(&self, name: impl Into<String>, key: InstanceKey) -> Self {
        let mut new = self.clone();
        new.0.push(ModuleInstanceStep {
            name: name.into(),
            key,
        });
        new
    }

    /// Parent module instance, or `None` for the root
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Split into parent address and final call, or `None` for the root
    #[must_use]
    pub fn call(&self) -> Option<(Self, ModuleCall)> {
        let last = self.0.last()?;
        let call = ModuleCall {
            name: last.name.clone(),
        };
        Some((Self(self.0[..self.0.len() - 1].to_vec()), call))
    }

    /// Check whether this address is a strict ancestor of another
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.0 == other.0[..self.0.len()]
    }
}

impl Display for ModuleInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
