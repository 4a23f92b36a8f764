//! Output value and local value addresses

use crate::module::ModuleInstance;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Absolute address of a module output value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbsOutputValue {
    /// Module instance declaring the output
    pub module: ModuleInstance,
    /// Output name
    pub name: String,
}

impl AbsOutputValue {
    /// Output value address in the given module
    #[inline]
    #[must_use]
    pub fn new(module: ModuleInstance, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }
}

impl Display for AbsOutputValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.module.is_root() {
            write!(f, "output.{}", self.name)
        } else {
            write!(f, "{}.output.{}", self.module, self.name)
        }
    }
}

/// Absolute address of a module local value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbsLocalValue {
    /// Module instance declaring the local
    pub module: ModuleInstance,
    /// Local value name
    pub name: String,
}

impl AbsLocalValue {
    /// Local value address in the given module
    #[inline]
    #[must_use]
    pub fn new(module: ModuleInstance, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }
}

impl Display for AbsLocalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.module.is_root() {
            write!(f, "local.{}", self.name)
        } else {
            write!(f, "{}.local.{}", self.module, self.name)
        }
    }
}
