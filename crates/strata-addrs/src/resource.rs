//! Resource and resource instance addresses

use crate::error::AddrParseError;
use crate::instance_key::InstanceKey;
use crate::module::ModuleInstance;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Whether a resource is managed by the engine or merely read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceMode {
    /// Resource whose lifecycle the engine owns
    Managed,
    /// Read-only data source
    Data,
}

/// Address of one resource block within its module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Resource {
    /// Managed or data
    pub mode: ResourceMode,
    /// Resource type, e.g. `aws_instance`
    pub type_name: String,
    /// Configuration-local name
    pub name: String,
}

impl Resource {
    /// Managed resource address
    #[inline]
    #[must_use]
    pub fn managed(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: ResourceMode::Managed,
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Data resource address
    #[inline]
    #[must_use]
    pub fn data(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: ResourceMode::Data,
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Address of one instance of this resource
    #[inline]
    #[must_use]
    pub fn instance(&self, key: InstanceKey) -> ResourceInstance {
        ResourceInstance {
            resource: self.clone(),
            key,
        }
    }

    /// Absolute form of this address within the given module
    #[inline]
    #[must_use]
    pub fn absolute(&self, module: ModuleInstance) -> AbsResource {
        AbsResource {
            module,
            resource: self.clone(),
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.mode {
            ResourceMode::Managed => write!(f, "{}.{}", self.type_name, self.name),
            ResourceMode::Data => write!(f, "data.{}.{}", self.type_name, self.name),
        }
    }
}

impl FromStr for Resource {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let (mode, type_name, name) = match parts.as_slice() {
            [type_name, name] => (ResourceMode::Managed, *type_name, *name),
            ["data", type_name, name] => (ResourceMode::Data, *type_name, *name),
            _ => return Err(AddrParseError::InvalidResourceAddress(s.to_string())),
        };
        for part in [type_name, name] {
            if part.is_empty() {
                return Err(AddrParseError::EmptyComponent);
            }
            if part.contains(|c: char| !c.is_alphanumeric() && c != '_' && c != '-') {
                return Err(AddrParseError::InvalidComponent(part.to_string()));
            }
        }
        Ok(Self {
            mode,
            type_name: type_name.to_string(),
            name: name.to_string(),
        })
    }
}

/// Address of one resource instance within its module
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceInstance {
    /// The declaring resource block
    pub resource: Resource,
    /// Repetition key of this instance
    pub key: InstanceKey,
}

impl ResourceInstance {
    /// Absolute form of this address within the given module
    #[inline]
    #[must_use]
    pub fn absolute(&self, module: ModuleInstance) -> AbsResourceInstance {
        AbsResourceInstance {
            module,
            resource: self.clone(),
        }
    }
}

impl Display for ResourceInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.resource, self.key)
    }
}

/// Absolute address of a resource: module instance plus resource
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbsResource {
    /// Containing module instance
    pub module: ModuleInstance,
    /// Resource within that module
    pub resource: Resource,
}

impl AbsResource {
    /// Absolute address of one instance of this resource
    #[inline]
    #[must_use]
    pub fn instance(&self, key: InstanceKey) -> AbsResourceInstance {
        AbsResourceInstance {
            module: self.module.clone(),
            resource: self.resource.instance(key),
        }
    }
}

impl Display for AbsResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.module.is_root() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}.{}", self.module, self.resource)
        }
    }
}

/// Absolute address of a resource instance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbsResourceInstance {
    /// Containing module instance
    pub module: ModuleInstance,
    /// Resource instance within that module
    pub resource: ResourceInstance,
}

impl AbsResourceInstance {
    /// Address of the resource block containing this instance
    #[inline]
    #[must_use]
    pub fn containing_resource(&self) -> AbsResource {
        AbsResource {
            module: self.module.clone(),
            resource: self.resource.resource.clone(),
        }
    }
}

impl Display for AbsResourceInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.module.is_root() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}.{}", self.module, self.resource)
        }
    }
}
