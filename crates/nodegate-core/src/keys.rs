//! Well-known keys shared with the control plane and the job model.
//!
//! Keys are matched exactly. Values attached to the scheduler taint are
//! compared through [`crate::text::normalize`].

// ── Scheduler selection ───────────────────────────────────────────

/// Taint (node) and toleration (pod) key naming the target scheduler.
pub const TAINT_SCHEDULER: &str = "node.nodegate.io/scheduler";

/// Scheduler taint value selecting the legacy bin-packing scheduler.
pub const TAINT_SCHEDULER_VALUE_LEGACY: &str = "fenzo";

/// Scheduler taint value selecting the cluster's native scheduler.
pub const TAINT_SCHEDULER_VALUE_MODERN: &str = "kubescheduler";

// ── Node labels and addresses ─────────────────────────────────────

pub const NODE_LABEL_ZONE: &str = "topology.kubernetes.io/zone";

/// Deprecated zone label, still set by older node images.
pub const NODE_LABEL_ZONE_LEGACY: &str = "failure-domain.beta.kubernetes.io/zone";

pub const NODE_ADDRESS_INTERNAL_IP: &str = "InternalIP";

// ── Pod annotations ───────────────────────────────────────────────

pub const ANNOTATION_IP_ADDRESS: &str = "IpAddress";
pub const ANNOTATION_IS_ROUTABLE_IP: &str = "IsRoutableIp";
pub const ANNOTATION_ENI_IPV6_ADDRESS: &str = "EniIPv6Address";
pub const ANNOTATION_ENI_IP_ADDRESS: &str = "EniIpAddress";
pub const ANNOTATION_ENI_ID: &str = "EniId";
pub const ANNOTATION_RESOURCE_ID: &str = "ResourceId";
pub const ANNOTATION_CONTAINER_INFO: &str = "containerInfo";
pub const ANNOTATION_JOB_DESCRIPTOR: &str = "jobDescriptor";
pub const ANNOTATION_RUNTIME_PREDICTION: &str = "predictions.scheduler.nodegate.io/runtime";
pub const ANNOTATION_OPPORTUNISTIC_CPU_COUNT: &str = "opportunistic.scheduler.nodegate.io/cpu";
pub const ANNOTATION_OPPORTUNISTIC_ID: &str = "opportunistic.scheduler.nodegate.io/id";

/// Unit marker appended to the runtime prediction annotation.
pub const RUNTIME_PREDICTION_UNIT: &str = "s";

// ── Job and task attributes ───────────────────────────────────────

/// Job attribute carrying the predicted runtime in seconds.
pub const JOB_ATTRIBUTE_RUNTIME_PREDICTION_SEC: &str = "nodegate.runtimePrediction.sec";

/// Hard constraint pinning a job to one availability zone.
pub const JOB_CONSTRAINT_AVAILABILITY_ZONE: &str = "availabilityzone";

pub const TASK_ATTRIBUTE_OPPORTUNISTIC_CPU_COUNT: &str = "task.opportunisticCpus";
pub const TASK_ATTRIBUTE_OPPORTUNISTIC_CPU_ALLOCATION: &str = "task.opportunisticCpuAllocation";

// ── Sentinels ─────────────────────────────────────────────────────

pub const UNKNOWN_IP_ADDRESS: &str = "UnknownIpAddress";
pub const UNKNOWN_ENI_IP_ADDRESS: &str = "UnknownEniIpAddress";
pub const UNKNOWN_ENI_ID: &str = "UnknownEniId";
pub const UNKNOWN_RESOURCE_ID: &str = "UnknownResourceId";
