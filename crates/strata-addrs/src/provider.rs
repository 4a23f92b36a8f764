//! Provider configuration addresses
//!
//! Every resource records which provider configuration is responsible for
//! it. The reference is resource-wide: all instances of one resource share
//! the same provider configuration.

use crate::module::ModuleInstance;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Address of one provider configuration block
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Module instance the configuration was declared in
    pub module: ModuleInstance,
    /// Provider name, e.g. `aws`
    pub name: String,
    /// Optional alias distinguishing additional configurations
    pub alias: Option<String>,
}

impl ProviderConfig {
    /// Default (unaliased) configuration of a provider in the root module
    #[inline]
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            module: ModuleInstance::root(),
            name: name.into(),
            alias: None,
        }
    }

    /// Aliased variant of this configuration
    #[inline]
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl Display for ProviderConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.module.is_root() {
            write!(f, "{}.", self.module)?;
        }
        write!(f, "provider.{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, ".{alias}")?;
        }
        Ok(())
    }
}
