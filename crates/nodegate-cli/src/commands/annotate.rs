use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use nodegate_core::GateConfig;
use nodegate_pod::AnnotationCodec;
use nodegate_state::{Job, Task};

use crate::OutputFormat;

pub fn run(
    config: &GateConfig,
    job_path: &Path,
    task_path: &Path,
    container_info_path: Option<&Path>,
    no_job_descriptor: bool,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let job: Job = super::read_snapshot(job_path)?;
    let task: Task = super::read_snapshot(task_path)?;
    let container_info = match container_info_path {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => Vec::new(),
    };
    let include_job_descriptor = config.annotations.include_job_descriptor && !no_job_descriptor;
    info!(job = %job.id, task = %task.id, include_job_descriptor, "building pod annotations");

    render(config, &job, &task, &container_info, include_job_descriptor, format)
}

fn render(
    config: &GateConfig,
    job: &Job,
    task: &Task,
    container_info: &[u8],
    include_job_descriptor: bool,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let codec = AnnotationCodec::from_config(&config.annotations);
    let annotations = codec.build(job, task, container_info, &HashMap::new(), include_job_descriptor);
    let sorted: BTreeMap<_, _> = annotations.into_iter().collect();

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&sorted)?,
        OutputFormat::Text => sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegate_core::keys::{ANNOTATION_CONTAINER_INFO, ANNOTATION_JOB_DESCRIPTOR};
    use nodegate_state::JobDescriptor;

    fn job() -> Job {
        Job::new(
            "job-1",
            JobDescriptor {
                application_name: "app".to_string(),
                ..JobDescriptor::default()
            },
        )
    }

    #[test]
    fn text_output_is_sorted_key_value_lines() {
        let out = render(
            &GateConfig::default(),
            &job(),
            &Task::new("task-1", "job-1"),
            b"info",
            true,
            OutputFormat::Text,
        )
        .unwrap();
        let keys: Vec<&str> = out.lines().map(|l| l.split('=').next().unwrap()).collect();
        assert_eq!(keys, vec![ANNOTATION_CONTAINER_INFO, ANNOTATION_JOB_DESCRIPTOR]);
    }

    #[test]
    fn descriptor_can_be_left_out() {
        let out = render(
            &GateConfig::default(),
            &job(),
            &Task::new("task-1", "job-1"),
            b"",
            false,
            OutputFormat::Json,
        )
        .unwrap();
        assert!(!out.contains(ANNOTATION_JOB_DESCRIPTOR));
    }
}
