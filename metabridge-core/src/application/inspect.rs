// metabridge-core/src/application/inspect.rs

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use tracing::instrument;

use crate::domain::entity::partition_records;
use crate::error::MetabridgeError;
use crate::infrastructure::export::{ExportShape, load_export};

/// Overview of an export file, without contacting any catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ExportInspection {
    pub shape: ExportShape,
    pub environment: Option<String>,
    pub mutations_applied: bool,
    pub embedded_rules: usize,
    pub total: usize,
    pub valid: usize,
    pub invalid: Vec<String>,
    pub with_platform_instance: usize,
    /// Counts in first-seen order.
    pub platforms: IndexMap<String, usize>,
    pub entity_types: IndexMap<String, usize>,
}

#[instrument]
pub fn inspect_export(path: &Path) -> Result<ExportInspection, MetabridgeError> {
    let document = load_export(path)?;
    let total = document.entities.len();
    let embedded_rules = document
        .metadata
        .embedded_rules()
        .map(|r| r.rule_count())
        .unwrap_or(0);

    let (sources, rejected) = partition_records(document.entities);

    let mut platforms: IndexMap<String, usize> = IndexMap::new();
    let mut entity_types: IndexMap<String, usize> = IndexMap::new();
    for source in &sources {
        let platform = if source.platform.is_empty() {
            "(none)".to_string()
        } else {
            source.platform.clone()
        };
        *platforms.entry(platform).or_default() += 1;
        *entity_types.entry(source.entity_type.clone()).or_default() += 1;
    }

    Ok(ExportInspection {
        shape: document.shape,
        environment: document.metadata.environment,
        mutations_applied: document.metadata.mutations_applied,
        embedded_rules,
        total,
        valid: sources.len(),
        invalid: rejected.iter().map(|e| e.to_string()).collect(),
        with_platform_instance: sources
            .iter()
            .filter(|s| s.platform_instance.is_some())
            .count(),
        platforms,
        entity_types,
    })
}
