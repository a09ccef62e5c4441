//! Zone dataset loading.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use dns_verifier_core::Zone;
use serde::Deserialize;

/// Top-level document emitted by the zone-management tool.
#[derive(Debug, Deserialize)]
struct Dataset {
    #[serde(alias = "Domains", default)]
    domains: Option<Vec<Zone>>,
}

/// Read and parse the dataset from `path`, or from stdin when `None`.
pub fn load_zones(path: Option<&Path>) -> anyhow::Result<Vec<Zone>> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read input")?;
            raw
        }
    };
    parse_zones(&raw)
}

/// Parse a dataset document into zones.
pub fn parse_zones(raw: &str) -> anyhow::Result<Vec<Zone>> {
    let dataset: Dataset =
        serde_json::from_str(raw).context("Failed to parse zone dataset")?;
    let zones = dataset.domains.unwrap_or_default();
    tracing::debug!(
        "Loaded {} zone(s) with {} record(s)",
        zones.len(),
        zones.iter().map(|z| z.records.len()).sum::<usize>()
    );
    Ok(zones)
}
