//! Node filtering stage for the legacy scheduler.
//!
//! Given the current node snapshot list, splits nodes into those the
//! legacy scheduler may consider and those left to the native scheduler.

use std::collections::HashMap;

use tracing::{debug, info};

use nodegate_core::SchedulingPolicy;
use nodegate_state::Node;

use crate::ownership::{OwnershipVerdict, verdict_for};

/// Nodes split by which scheduler may consider them.
#[derive(Debug, Clone, Default)]
pub struct OwnershipPartition<'a> {
    pub legacy: Vec<&'a Node>,
    /// Nodes excluded from the legacy scheduler, with the reason.
    pub modern: Vec<(&'a Node, OwnershipVerdict)>,
}

impl OwnershipPartition<'_> {
    /// Count of excluded nodes per reason, keyed by verdict tag.
    pub fn exclusion_counts(&self) -> HashMap<&'static str, usize> {
        let mut counts = HashMap::new();
        for (_, verdict) in &self.modern {
            let tag = match verdict {
                OwnershipVerdict::Owned => continue,
                OwnershipVerdict::Farzone { .. } => "farzone",
                OwnershipVerdict::ForeignSchedulerTaint => "foreign_scheduler_taint",
                OwnershipVerdict::UntoleratedTaint { .. } => "untolerated_taint",
            };
            *counts.entry(tag).or_insert(0) += 1;
        }
        counts
    }
}

/// Applies the ownership rules of one [`SchedulingPolicy`] to node lists.
#[derive(Debug, Clone)]
pub struct NodeFilter {
    policy: SchedulingPolicy,
}

impl NodeFilter {
    pub fn new(policy: SchedulingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn verdict(&self, node: &Node) -> OwnershipVerdict {
        verdict_for(&self.policy, node)
    }

    pub fn is_legacy_owned(&self, node: &Node) -> bool {
        self.verdict(node).is_owned()
    }

    /// Nodes the legacy scheduler may consider, in input order.
    pub fn filter_legacy<'a>(&self, nodes: &'a [Node]) -> Vec<&'a Node> {
        self.partition(nodes).legacy
    }

    /// Split `nodes` into legacy-owned and excluded, preserving order.
    pub fn partition<'a>(&self, nodes: &'a [Node]) -> OwnershipPartition<'a> {
        let mut partition = OwnershipPartition::default();

        for node in nodes {
            match self.verdict(node) {
                OwnershipVerdict::Owned => partition.legacy.push(node),
                verdict => {
                    debug!(node = %node.name(), %verdict, "node excluded from legacy scheduler");
                    partition.modern.push((node, verdict));
                }
            }
        }

        info!(
            total = nodes.len(),
            legacy = partition.legacy.len(),
            excluded = partition.modern.len(),
            "node ownership pass complete"
        );
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegate_core::keys::TAINT_SCHEDULER;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::named("plain"),
            Node::named("legacy").with_taint(TAINT_SCHEDULER, "fenzo"),
            Node::named("modern").with_taint(TAINT_SCHEDULER, "kubescheduler"),
            Node::named("far").with_zone("eu-west-1a"),
            Node::named("gpu").with_taint("nvidia.com/gpu", "true"),
        ]
    }

    #[test]
    fn partition_preserves_order() {
        let filter = NodeFilter::new(SchedulingPolicy::new(["eu-west-1a"], Vec::<String>::new()));
        let nodes = sample_nodes();
        let partition = filter.partition(&nodes);

        let legacy: Vec<&str> = partition.legacy.iter().map(|n| n.name()).collect();
        assert_eq!(legacy, vec!["plain", "legacy"]);

        let excluded: Vec<&str> = partition.modern.iter().map(|(n, _)| n.name()).collect();
        assert_eq!(excluded, vec!["modern", "far", "gpu"]);
    }

    #[test]
    fn exclusion_counts_by_reason() {
        let filter = NodeFilter::new(SchedulingPolicy::new(["eu-west-1a"], Vec::<String>::new()));
        let nodes = sample_nodes();
        let counts = filter.partition(&nodes).exclusion_counts();

        assert_eq!(counts.get("farzone"), Some(&1));
        assert_eq!(counts.get("foreign_scheduler_taint"), Some(&1));
        assert_eq!(counts.get("untolerated_taint"), Some(&1));
    }

    #[test]
    fn tolerated_keys_widen_legacy_pool() {
        let filter = NodeFilter::new(SchedulingPolicy::new(Vec::<String>::new(), ["nvidia.com/gpu"]));
        let nodes = sample_nodes();
        let legacy = filter.filter_legacy(&nodes);

        assert_eq!(legacy.len(), 4);
        assert!(filter.is_legacy_owned(&nodes[4]));
    }

    #[test]
    fn empty_node_list() {
        let filter = NodeFilter::new(SchedulingPolicy::default());
        let partition = filter.partition(&[]);
        assert!(partition.legacy.is_empty());
        assert!(partition.modern.is_empty());
    }
}
