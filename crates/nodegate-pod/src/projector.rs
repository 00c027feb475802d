//! Pod state projection for task reconciliation.
//!
//! Turns a pod snapshot into the facts the reconciliation loop acts on:
//! the container lifecycle state, executor network details published by
//! the node agent, and the facts encoded at launch.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use nodegate_core::keys::*;
use nodegate_core::text::{non_blank, normalize};
use nodegate_state::{ContainerState, Node, Pod, TerminatedState};

use crate::annotations::{
    OpportunisticResources, decode_opportunistic_resources, decode_runtime_prediction,
};

/// Network facts an executor publishes through pod annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutorNetworkDetails {
    pub is_routable_ip: bool,
    pub ip_address: String,
    pub eni_ipv6_address: Option<String>,
    pub eni_ip_address: String,
    pub eni_id: String,
    pub resource_id: String,
}

/// Everything the reconciliation loop reads from one pod.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PodProjection {
    pub pod: String,
    pub state: Option<ContainerState>,
    pub network: Option<ExecutorNetworkDetails>,
    pub opportunistic: Option<OpportunisticResources>,
    pub runtime_prediction: Option<Duration>,
}

/// State of the first container that has one.
///
/// Containers whose state is not reported yet are skipped.
pub fn find_container_state(pod: &Pod) -> Option<&ContainerState> {
    pod.container_statuses()
        .iter()
        .map(|status| &status.state)
        .find(|state| state.is_set())
}

/// [`find_container_state`], if it is a terminated state.
pub fn find_terminated_state(pod: &Pod) -> Option<&TerminatedState> {
    find_container_state(pod).and_then(ContainerState::as_terminated)
}

/// Display adapter rendering a container state for diagnostics.
pub struct FormattedState<'a>(pub &'a ContainerState);

impl fmt::Display for FormattedState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("null")
        }

        match self.0 {
            ContainerState::Waiting(w) => write!(
                f,
                "{{state=waiting, reason={}, message={}}}",
                show(&w.reason),
                show(&w.message)
            ),
            ContainerState::Running(r) => {
                write!(f, "{{state=running, startedAt={}}}", show(&r.started_at))
            }
            ContainerState::Terminated(t) => write!(
                f,
                "{{state=terminated, startedAt={}, finishedAt={}, reason={}, message={}}}",
                show(&t.started_at),
                show(&t.finished_at),
                show(&t.reason),
                show(&t.message)
            ),
            ContainerState::Unset => write!(f, "{{state=<not set>}}"),
        }
    }
}

/// Render a container state for logs. Not meant to be parsed.
pub fn format_state(state: &ContainerState) -> String {
    FormattedState(state).to_string()
}

/// Executor network details, present only when the primary IP annotation
/// is set.
pub fn get_executor_network_details(pod: &Pod) -> Option<ExecutorNetworkDetails> {
    network_details_from(pod.annotations())
}

/// Blank annotations count as absent: ENI fields fall back to their
/// sentinels and a blank IPv6 address is `None`.
fn network_details_from(annotations: &HashMap<String, String>) -> Option<ExecutorNetworkDetails> {
    let lookup = |key: &str| non_blank(annotations.get(key).map(String::as_str));
    let ip_address = lookup(ANNOTATION_IP_ADDRESS)?;

    let is_routable_ip = match lookup(ANNOTATION_IS_ROUTABLE_IP).map(normalize).as_deref() {
        Some("false") => false,
        Some("true") | None => true,
        Some(other) => {
            warn!(value = other, "unparseable routable flag, assuming routable");
            true
        }
    };

    Some(ExecutorNetworkDetails {
        is_routable_ip,
        ip_address: ip_address.to_string(),
        eni_ipv6_address: lookup(ANNOTATION_ENI_IPV6_ADDRESS).map(str::to_string),
        eni_ip_address: lookup(ANNOTATION_ENI_IP_ADDRESS)
            .unwrap_or(UNKNOWN_ENI_IP_ADDRESS)
            .to_string(),
        eni_id: lookup(ANNOTATION_ENI_ID).unwrap_or(UNKNOWN_ENI_ID).to_string(),
        resource_id: lookup(ANNOTATION_RESOURCE_ID)
            .unwrap_or(UNKNOWN_RESOURCE_ID)
            .to_string(),
    })
}

/// First internal IPv4 address of the node, or the unknown-address sentinel.
pub fn get_node_ipv4_address(node: &Node) -> String {
    node.status
        .addresses
        .iter()
        .find(|a| {
            a.address_type.eq_ignore_ascii_case(NODE_ADDRESS_INTERNAL_IP)
                && a.address.parse::<Ipv4Addr>().is_ok()
        })
        .map(|a| a.address.clone())
        .unwrap_or_else(|| UNKNOWN_IP_ADDRESS.to_string())
}

/// Project a pod into the facts the reconciliation loop needs.
pub fn project(pod: &Pod) -> PodProjection {
    let annotations = pod.annotations();
    PodProjection {
        pod: pod.name().to_string(),
        state: find_container_state(pod).cloned(),
        network: network_details_from(annotations),
        opportunistic: decode_opportunistic_resources(annotations),
        runtime_prediction: decode_runtime_prediction(annotations),
    }
}
