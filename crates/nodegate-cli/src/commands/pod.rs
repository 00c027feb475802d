use std::path::Path;

use serde::Serialize;
use tracing::info;

use nodegate_placement::is_owned_by_modern_scheduler;
use nodegate_pod::{PodProjection, format_state, project};
use nodegate_state::Pod;

use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct PodReport {
    #[serde(flatten)]
    projection: PodProjection,
    modern_scheduler: bool,
}

pub fn run(path: &Path, format: OutputFormat) -> anyhow::Result<String> {
    let pods: Vec<Pod> = super::read_snapshots(path)?;
    info!(path = %path.display(), pods = pods.len(), "projecting pod state");
    render(&pods, format)
}

fn render(pods: &[Pod], format: OutputFormat) -> anyhow::Result<String> {
    let reports: Vec<PodReport> = pods
        .iter()
        .map(|pod| PodReport {
            projection: project(pod),
            modern_scheduler: is_owned_by_modern_scheduler(pod),
        })
        .collect();

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&reports)?,
        OutputFormat::Text => reports.iter().map(text_line).collect::<Vec<_>>().join("\n"),
    })
}

fn text_line(report: &PodReport) -> String {
    let p = &report.projection;
    let state = p
        .state
        .as_ref()
        .map(format_state)
        .unwrap_or_else(|| "{state=<none>}".to_string());
    let ip = p
        .network
        .as_ref()
        .map(|n| n.ip_address.as_str())
        .unwrap_or("-");
    let scheduler = if report.modern_scheduler { "native" } else { "legacy" };
    format!("{:<40} {:<8} {:<16} {}", p.pod, scheduler, ip, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegate_core::keys::{ANNOTATION_IP_ADDRESS, TAINT_SCHEDULER};
    use nodegate_state::{ContainerState, RunningState};

    #[test]
    fn text_report_shows_state_and_ip() {
        let pod = Pod::named("task-1")
            .with_toleration(TAINT_SCHEDULER, "kubescheduler")
            .with_annotation(ANNOTATION_IP_ADDRESS, "10.0.0.5")
            .with_container_state("main", ContainerState::Running(RunningState::default()));

        let out = render(&[pod], OutputFormat::Text).unwrap();
        assert!(out.contains("native"));
        assert!(out.contains("10.0.0.5"));
        assert!(out.contains("{state=running, startedAt=null}"));
    }

    #[test]
    fn pending_pod_has_no_state() {
        let out = render(&[Pod::named("pending")], OutputFormat::Text).unwrap();
        assert!(out.contains("{state=<none>}"));
        assert!(out.contains("legacy"));
    }
}
