//! nodegate.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Total annotation budget enforced by the control plane (256 KiB).
pub const DEFAULT_MAX_ANNOTATION_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub annotations: AnnotationsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Zones handled exclusively by the native scheduler.
    #[serde(default)]
    pub farzones: Vec<String>,
    /// Taint keys the legacy scheduler may ignore besides the scheduler taint.
    #[serde(default)]
    pub tolerated_taint_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationsConfig {
    #[serde(default = "default_include_job_descriptor")]
    pub include_job_descriptor: bool,
    #[serde(default = "default_max_total_bytes")]
    pub max_total_bytes: usize,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            include_job_descriptor: default_include_job_descriptor(),
            max_total_bytes: default_max_total_bytes(),
        }
    }
}

fn default_include_job_descriptor() -> bool {
    true
}

fn default_max_total_bytes() -> usize {
    DEFAULT_MAX_ANNOTATION_BYTES
}

/// Immutable scheduling configuration handed to the ownership checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulingPolicy {
    pub farzones: Vec<String>,
    pub tolerated_taint_keys: HashSet<String>,
}

impl SchedulingPolicy {
    pub fn new<F, T>(farzones: F, tolerated_taint_keys: T) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            farzones: farzones.into_iter().map(Into::into).collect(),
            tolerated_taint_keys: tolerated_taint_keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl GateConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: GateConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Snapshot of the scheduling section as an immutable policy value.
    pub fn scheduling_policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::new(
            self.scheduling.farzones.iter().cloned(),
            self.scheduling.tolerated_taint_keys.iter().cloned(),
        )
    }
}
