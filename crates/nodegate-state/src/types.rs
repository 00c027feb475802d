//! Node and pod snapshots as handed in by the cluster watch.
//!
//! Field names follow the control plane's JSON object layout so that
//! snapshots can be deserialized straight from watch events. Nothing in
//! this crate mutates a snapshot after it is built.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use nodegate_core::keys::{NODE_LABEL_ZONE, NODE_LABEL_ZONE_LEGACY};
use nodegate_core::text::non_blank;

/// Name of a node in the cluster.
pub type NodeName = String;

/// Name of a pod in the cluster.
pub type PodName = String;

// ── Metadata ──────────────────────────────────────────────────────

/// Metadata common to nodes and pods.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Size-limited string map; see `nodegate-pod` for the budget.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

// ── Node ──────────────────────────────────────────────────────────

/// A compute host visible to both schedulers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeSpec {
    #[serde(default)]
    pub taints: Vec<Taint>,
}

/// A key/value marker a node declares to repel schedulers that do not
/// tolerate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Taint {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    #[serde(default)]
    pub addresses: Vec<NodeAddress>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeAddress {
    /// Address kind: "InternalIP", "ExternalIP", "Hostname", ...
    #[serde(rename = "type")]
    pub address_type: String,
    pub address: String,
}

impl Node {
    /// Build a bare node snapshot with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                ..ObjectMeta::default()
            },
            ..Self::default()
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.metadata.labels.insert(NODE_LABEL_ZONE.to_string(), zone.into());
        self
    }

    pub fn with_taint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.taints.push(Taint::new(key, value));
        self
    }

    pub fn with_address(mut self, address_type: impl Into<String>, address: impl Into<String>) -> Self {
        self.status.addresses.push(NodeAddress {
            address_type: address_type.into(),
            address: address.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Zone label, if set to something non-blank.
    ///
    /// Falls back to the deprecated beta label when the topology label is
    /// missing or blank.
    pub fn zone(&self) -> Option<&str> {
        let labels = &self.metadata.labels;
        non_blank(labels.get(NODE_LABEL_ZONE).map(String::as_str))
            .or_else(|| non_blank(labels.get(NODE_LABEL_ZONE_LEGACY).map(String::as_str)))
    }

    pub fn taints(&self) -> &[Taint] {
        &self.spec.taints
    }
}

impl Taint {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            effect: Some("NoSchedule".to_string()),
        }
    }

    /// Taint value, or the empty string when unset.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

// ── Pod ───────────────────────────────────────────────────────────

/// A pod snapshot: metadata, declared tolerations, and container statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PodStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PodSpec {
    #[serde(default)]
    pub tolerations: Vec<Toleration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toleration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    /// `None` when the control plane has not reported any status yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_statuses: Option<Vec<ContainerStatus>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_state")]
    pub state: ContainerState,
}

impl Pod {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                ..ObjectMeta::default()
            },
            ..Self::default()
        }
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_toleration(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spec.tolerations.push(Toleration {
            key: Some(key.into()),
            operator: Some("Equal".to_string()),
            value: Some(value.into()),
            effect: Some("NoSchedule".to_string()),
        });
        self
    }

    /// Append a container status. The status list is created on first use.
    pub fn with_container_state(mut self, name: impl Into<String>, state: ContainerState) -> Self {
        self.status
            .get_or_insert_with(PodStatus::default)
            .container_statuses
            .get_or_insert_with(Vec::new)
            .push(ContainerStatus {
                name: name.into(),
                state,
            });
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn annotations(&self) -> &HashMap<String, String> {
        &self.metadata.annotations
    }

    /// Container statuses in reported order; empty when absent.
    pub fn container_statuses(&self) -> &[ContainerStatus] {
        self.status
            .as_ref()
            .and_then(|s| s.container_statuses.as_deref())
            .unwrap_or(&[])
    }
}

// ── Container state ───────────────────────────────────────────────

/// Lifecycle state of a single container. Exactly one case is active.
///
/// On the wire this is an object with three optional members; it is
/// converted to and from that layout through [`RawContainerState`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawContainerState", into = "RawContainerState")]
pub enum ContainerState {
    #[default]
    Unset,
    Waiting(WaitingState),
    Running(RunningState),
    Terminated(TerminatedState),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaitingState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunningState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TerminatedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ContainerState {
    pub fn is_set(&self) -> bool {
        !matches!(self, ContainerState::Unset)
    }

    pub fn as_terminated(&self) -> Option<&TerminatedState> {
        match self {
            ContainerState::Terminated(t) => Some(t),
            _ => None,
        }
    }
}

/// Wire layout of a container state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawContainerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting: Option<WaitingState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<RunningState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminated: Option<TerminatedState>,
}

impl From<RawContainerState> for ContainerState {
    /// The first populated member wins, in the order waiting, running,
    /// terminated.
    fn from(raw: RawContainerState) -> Self {
        if let Some(waiting) = raw.waiting {
            ContainerState::Waiting(waiting)
        } else if let Some(running) = raw.running {
            ContainerState::Running(running)
        } else if let Some(terminated) = raw.terminated {
            ContainerState::Terminated(terminated)
        } else {
            ContainerState::Unset
        }
    }
}

impl From<ContainerState> for RawContainerState {
    fn from(state: ContainerState) -> Self {
        let mut raw = RawContainerState::default();
        match state {
            ContainerState::Unset => {}
            ContainerState::Waiting(w) => raw.waiting = Some(w),
            ContainerState::Running(r) => raw.running = Some(r),
            ContainerState::Terminated(t) => raw.terminated = Some(t),
        }
        raw
    }
}

fn nullable_state<'de, D>(deserializer: D) -> Result<ContainerState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ContainerState>::deserialize(deserializer)?.unwrap_or_default())
}
