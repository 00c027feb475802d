use std::path::Path;

use serde::Serialize;
use tracing::info;

use nodegate_core::GateConfig;
use nodegate_placement::{NodeFilter, OwnershipVerdict};
use nodegate_pod::get_node_ipv4_address;
use nodegate_state::Node;

use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct NodeReport {
    node: String,
    ip: String,
    zone: Option<String>,
    #[serde(flatten)]
    verdict: OwnershipVerdict,
}

pub fn run(config: &GateConfig, path: &Path, format: OutputFormat) -> anyhow::Result<String> {
    let nodes: Vec<Node> = super::read_snapshots(path)?;
    info!(
        path = %path.display(),
        nodes = nodes.len(),
        farzones = config.scheduling.farzones.len(),
        "evaluating node ownership"
    );
    render(config, &nodes, format)
}

fn render(config: &GateConfig, nodes: &[Node], format: OutputFormat) -> anyhow::Result<String> {
    let filter = NodeFilter::new(config.scheduling_policy());
    let reports: Vec<NodeReport> = nodes
        .iter()
        .map(|node| NodeReport {
            node: node.name().to_string(),
            ip: get_node_ipv4_address(node),
            zone: node.zone().map(str::to_string),
            verdict: filter.verdict(node),
        })
        .collect();

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&reports)?,
        OutputFormat::Text => reports
            .iter()
            .map(|r| {
                let owner = if r.verdict.is_owned() { "legacy" } else { "native" };
                format!("{:<32} {:<16} {:<8} {}", r.node, r.ip, owner, r.verdict)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
