//! nodegate-state — read-only snapshots of cluster and job objects.
//!
//! Nodes and pods come from the cluster watch; jobs and tasks come from
//! the orchestrator's domain layer. All types are serde-serializable
//! and are never mutated once handed to the decision functions.

pub mod job;
pub mod types;

pub use job::*;
pub use types::*;
