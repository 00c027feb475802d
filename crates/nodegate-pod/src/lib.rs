//! nodegate-pod — pod projection and pod annotation codec.
//!
//! Pods carry two kinds of facts this crate cares about:
//!
//! - container statuses reported by the node, projected into a closed
//!   [`ContainerState`](nodegate_state::ContainerState) for reconciliation
//! - annotations written at launch (container info, job descriptor,
//!   opportunistic resources) and by the executor (network details)
//!
//! All functions are pure and can be called from any number of
//! reconciliation workers concurrently.

pub mod annotations;
pub mod error;
pub mod projector;

pub use annotations::{
    AnnotationCodec, AnnotationContributor, DescriptorFormat, JsonDescriptorFormat,
    MAX_DECODED_DESCRIPTOR_BYTES, OpportunisticResources, annotations_size, build_annotations,
    decode_container_info, decode_job_descriptor, decode_job_descriptor_within,
    decode_opportunistic_resources, decode_runtime_prediction,
};
pub use error::{CodecError, CodecResult};
pub use projector::{
    ExecutorNetworkDetails, FormattedState, PodProjection, find_container_state,
    find_terminated_state, format_state, get_executor_network_details, get_node_ipv4_address,
    project,
};
