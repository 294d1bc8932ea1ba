use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use lodgeo::enrich::ParsedEntity;

use super::session::{print_json, Session};

/// Accepted input shapes: a bare array or an entity list document
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum EntityInput {
    List {
        entities: Vec<ParsedEntity>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Bare(Vec<ParsedEntity>),
}

impl EntityInput {
    fn entities_mut(&mut self) -> &mut [ParsedEntity] {
        match self {
            Self::List { entities, .. } | Self::Bare(entities) => entities,
        }
    }
}

pub async fn enrich(session: &Session, input: &Path, output: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read entities: {}", input.display()))?;
    let mut document: EntityInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid entity file: {}", input.display()))?;

    let report = session
        .service
        .enricher()
        .enrich(document.entities_mut())
        .await;

    eprintln!(
        "Enriched {} entities: {} resolved, {} unresolved, {} skipped, {} failed lookups",
        report.outcomes.len(),
        report.resolved(),
        report.unresolved(),
        report.skipped(),
        report.failures
    );

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&document)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            tracing::info!(path = %path.display(), "Enriched entities written");
            Ok(())
        }
        None => print_json(&document),
    }
}
