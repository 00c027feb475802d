pub mod annotate;
pub mod node;
pub mod pod;

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// A snapshot file holding either one object or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

pub fn read_snapshots<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let parsed: OneOrMany<T> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    let items = match parsed {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    };
    debug!(path = %path.display(), count = items.len(), "read snapshots");
    Ok(items)
}

pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
