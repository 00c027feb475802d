//! Node ownership arbitration between the legacy and native schedulers.
//!
//! Both schedulers run against the same node pool during migration. The
//! legacy scheduler may only consider a node when all of the following
//! hold, checked in this order:
//!
//! 1. The node is not in a farzone.
//! 2. The node has no scheduler taint, or its scheduler taints agree on
//!    the legacy value.
//! 3. Every other taint key is in the tolerated set.
//!
//! Anything else excludes the node.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use nodegate_core::SchedulingPolicy;
use nodegate_core::keys::{TAINT_SCHEDULER, TAINT_SCHEDULER_VALUE_LEGACY};
use nodegate_core::text::normalize;
use nodegate_state::Node;

use crate::farzone::is_farzone_node;

/// Why a node is or is not owned by the legacy scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum OwnershipVerdict {
    Owned,
    /// The node's zone is reserved for the native scheduler.
    Farzone { zone: String },
    /// Scheduler taint names another scheduler, or is ambiguous.
    ForeignSchedulerTaint,
    /// A taint the legacy scheduler does not understand.
    UntoleratedTaint { key: String },
}

impl OwnershipVerdict {
    pub fn is_owned(&self) -> bool {
        matches!(self, OwnershipVerdict::Owned)
    }
}

impl fmt::Display for OwnershipVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnershipVerdict::Owned => write!(f, "owned"),
            OwnershipVerdict::Farzone { zone } => write!(f, "not owned (farzone {zone})"),
            OwnershipVerdict::ForeignSchedulerTaint => {
                write!(f, "not owned (non legacy scheduler taint)")
            }
            OwnershipVerdict::UntoleratedTaint { key } => {
                write!(f, "not owned (non tolerable taint {key})")
            }
        }
    }
}

/// Decide whether the legacy scheduler may consider `node`, with the reason.
pub fn ownership_verdict(
    farzones: &[String],
    tolerated_taint_keys: &HashSet<String>,
    node: &Node,
) -> OwnershipVerdict {
    let name = node.name();

    if is_farzone_node(farzones, node) {
        debug!(node = %name, "not owned by legacy scheduler (farzone node)");
        return OwnershipVerdict::Farzone {
            zone: node.zone().unwrap_or_default().to_string(),
        };
    }

    if !has_legacy_scheduler_taint(node) {
        debug!(node = %name, "not owned by legacy scheduler (non legacy scheduler taint)");
        return OwnershipVerdict::ForeignSchedulerTaint;
    }

    if node.taints().is_empty() {
        debug!(node = %name, "owned by legacy scheduler (no taint set)");
        return OwnershipVerdict::Owned;
    }

    let untolerated = node
        .taints()
        .iter()
        .find(|t| t.key != TAINT_SCHEDULER && !tolerated_taint_keys.contains(&t.key));
    if let Some(taint) = untolerated {
        debug!(
            node = %name,
            taint_key = %taint.key,
            "not owned by legacy scheduler (non tolerable taint found)"
        );
        return OwnershipVerdict::UntoleratedTaint {
            key: taint.key.clone(),
        };
    }

    debug!(node = %name, "owned by legacy scheduler (all taints tolerated)");
    OwnershipVerdict::Owned
}

/// Returns true if the legacy scheduler may place work on `node`.
pub fn is_node_owned_by_legacy_scheduler(
    farzones: &[String],
    tolerated_taint_keys: &HashSet<String>,
    node: &Node,
) -> bool {
    ownership_verdict(farzones, tolerated_taint_keys, node).is_owned()
}

/// [`ownership_verdict`] with both configuration values taken from a policy.
pub fn verdict_for(policy: &SchedulingPolicy, node: &Node) -> OwnershipVerdict {
    ownership_verdict(&policy.farzones, &policy.tolerated_taint_keys, node)
}

/// Returns true if the node has no scheduler taint, or all of its
/// scheduler taints normalize to the single legacy value.
///
/// Two or more distinct values are ambiguous and yield false.
pub fn has_legacy_scheduler_taint(node: &Node) -> bool {
    let values: BTreeSet<String> = node
        .taints()
        .iter()
        .filter(|t| t.key == TAINT_SCHEDULER)
        .map(|t| normalize(t.value_or_empty()))
        .collect();

    let mut iter = values.iter();
    match (iter.next(), iter.next()) {
        (None, _) => true,
        (Some(only), None) => *only == normalize(TAINT_SCHEDULER_VALUE_LEGACY),
        _ => false,
    }
}
