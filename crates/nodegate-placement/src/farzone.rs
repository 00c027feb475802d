//! Farzone resolution.
//!
//! A farzone is a zone carved out for the native scheduler. Nodes in a
//! farzone are never handed to the legacy scheduler, and jobs pinned to
//! one are routed accordingly.

use tracing::debug;

use nodegate_core::keys::JOB_CONSTRAINT_AVAILABILITY_ZONE;
use nodegate_core::text::{eq_normalized, non_blank};
use nodegate_state::{Job, Node};

/// Returns true if the node's zone label matches one of `farzones`.
///
/// A node without a zone label is never a farzone node.
pub fn is_farzone_node(farzones: &[String], node: &Node) -> bool {
    if farzones.is_empty() {
        return false;
    }
    let Some(zone) = node.zone() else {
        debug!(node = %node.name(), "node without zone label");
        return false;
    };

    let matched = farzones.iter().any(|farzone| eq_normalized(farzone, zone));
    if matched {
        debug!(node = %node.name(), zone, "farzone node");
    } else {
        debug!(node = %node.name(), zone, "non-farzone node");
    }
    matched
}

/// If the job carries an availability zone hard constraint naming a
/// farzone, return that farzone as configured.
pub fn find_farzone_id(farzones: &[String], job: &Job) -> Option<String> {
    if farzones.is_empty() {
        return None;
    }
    let zone = non_blank(job.hard_constraint(JOB_CONSTRAINT_AVAILABILITY_ZONE))?;

    farzones
        .iter()
        .find(|farzone| eq_normalized(farzone, zone))
        .cloned()
}
