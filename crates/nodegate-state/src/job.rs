//! Job and task snapshots from the orchestrator's domain model.
//!
//! Maps are `BTreeMap` so the serialized descriptor has a stable key
//! order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a job.
pub type JobId = String;

/// Unique identifier for a task within a job.
pub type TaskId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub descriptor: JobDescriptor,
}

/// Everything the owner declared when submitting the job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptor {
    #[serde(default)]
    pub owner: Owner,
    pub application_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_group: Option<String>,
    /// Free-form attributes, including the runtime prediction.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub container: Container,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub team_email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub image: Image,
    #[serde(default)]
    pub resources: ContainerResources,
    #[serde(default)]
    pub entry_point: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Placement constraints that must hold (e.g. availability zone).
    #[serde(default)]
    pub hard_constraints: BTreeMap<String, String>,
    /// Placement constraints honored when possible.
    #[serde(default)]
    pub soft_constraints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerResources {
    pub cpu: f64,
    pub gpu: u32,
    pub memory_mb: u32,
    pub disk_mb: u32,
    pub network_mbps: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    /// Free-form context, including opportunistic CPU facts.
    #[serde(default)]
    pub task_context: BTreeMap<String, String>,
}

impl Job {
    pub fn new(id: impl Into<String>, descriptor: JobDescriptor) -> Self {
        Self {
            id: id.into(),
            descriptor,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.descriptor.attributes.get(key).map(String::as_str)
    }

    /// Hard constraint lookup. Constraint names are case-insensitive.
    pub fn hard_constraint(&self, name: &str) -> Option<&str> {
        self.descriptor
            .container
            .hard_constraints
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl Task {
    pub fn new(id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            task_context: BTreeMap::new(),
        }
    }

    pub fn context(&self, key: &str) -> Option<&str> {
        self.task_context.get(key).map(String::as_str)
    }
}
