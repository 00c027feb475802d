//! nodegate-placement — which scheduler may consider a node.
//!
//! During the migration from the legacy bin-packing scheduler to the
//! cluster's native scheduler both run against the same node pool. This
//! crate decides node ownership from taints and zone labels, before any
//! placement happens. It does NOT pick a node for a task.
//!
//! # Components
//!
//! - **`farzone`** — Zone exceptions reserved for the native scheduler
//! - **`ownership`** — Legacy scheduler node ownership from taints
//! - **`membership`** — Native scheduler membership from pod tolerations
//! - **`filter`** — Node filtering stage over snapshot lists

pub mod farzone;
pub mod filter;
pub mod membership;
pub mod ownership;

pub use farzone::{find_farzone_id, is_farzone_node};
pub use filter::{NodeFilter, OwnershipPartition};
pub use membership::is_owned_by_modern_scheduler;
pub use ownership::{
    OwnershipVerdict, has_legacy_scheduler_taint, is_node_owned_by_legacy_scheduler,
    ownership_verdict, verdict_for,
};
