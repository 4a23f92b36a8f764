//! Structured addresses for everything the state engine can track
//!
//! Every record in the state tree is keyed by an address type from this
//! crate: module instances, resources and their instances, output values,
//! local values, and provider configurations. Addresses are plain values
//! with equality, ordering, hashing, and stable `Display` formatting, so
//! they can serve as map keys and appear verbatim in logs.

pub mod error;
pub mod instance_key;
pub mod module;
pub mod provider;
pub mod resource;
pub mod values;

pub use error::AddrParseError;
pub use instance_key::InstanceKey;
pub use module::{ModuleCall, ModuleInstance, ModuleInstanceStep};
pub use provider::ProviderConfig;
pub use resource::{AbsResource, AbsResourceInstance, Resource, ResourceInstance, ResourceMode};
pub use values::{AbsLocalValue, AbsOutputValue};
