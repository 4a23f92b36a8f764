//! In-memory state model for provisioned infrastructure
//!
//! This crate holds the authoritative record of every object an
//! infrastructure run knows about, organised as a tree: modules own
//! resources, outputs and locals; resources own instances; instances own
//! one current generation object plus any deposed generations awaiting
//! destruction.
//!
//! Two layers with a strict boundary:
//!
//! 1. The data model ([`State`], [`ModuleState`], [`ResourceState`],
//!    [`ResourceInstance`]) — pure single-threaded mutation primitives
//!    with no locking of their own.
//! 2. [`SyncState`] — the only concurrency-safe entry point. Graph-walk
//!    workers call it from many threads; it serialises writers behind one
//!    reader/writer lock, returns defensive copies from every read, and
//!    prunes emptied modules after every removal.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use strata_state::{State, SyncState, ResourceInstanceObject, ObjectStatus};
//!
//! let state = SyncState::new(State::new());
//!
//! // Many worker threads, one writer at a time:
//! state.set_resource_instance_current(&addr, Some(obj), provider, InstanceKey::NoKey);
//!
//! // Reads are private copies, safe to mutate:
//! let snapshot = state.resource_instance(&addr);
//!
//! // Hand the tree back when the walk is done:
//! let final_state = state.close();
//! ```

pub mod checks;
pub mod instance;
pub mod module;
pub mod object;
pub mod resource;
pub mod state;
pub mod sync;
pub mod value;

pub use checks::{CheckResult, CheckResults, CheckSource, CheckStatus};
pub use instance::{DeposedKey, Generation, InvalidDeposedKey, ResourceInstance};
pub use module::{ModuleState, OutputValue};
pub use object::{ObjectStatus, ResourceInstanceObject};
pub use resource::ResourceState;
pub use state::State;
pub use sync::SyncState;
pub use value::Value;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
