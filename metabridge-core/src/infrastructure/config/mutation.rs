// metabridge-core/src/infrastructure/config/mutation.rs

use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::mutation::MutationRules;
use crate::domain::project::EnvironmentConfig;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::export::ExportMetadata;

/// Reads a mutation table from YAML or JSON (JSON is valid YAML, but the
/// extension picks the parser for clearer errors).
#[instrument]
pub fn load_mutation_rules(path: &Path) -> Result<MutationRules, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    let rules: MutationRules = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    info!(rules = rules.rule_count(), "Mutation rules loaded");
    Ok(rules)
}

/// Picks the configured mutation table for a run. First found wins: the
/// CLI file, the environment's `mutations-file` (relative to
/// `project_dir`), then the environment's inline table. `None` lets the
/// pipeline fall back to the mapping embedded in the export.
pub fn resolve_mutation_rules(
    cli_file: Option<&Path>,
    environment: &EnvironmentConfig,
    project_dir: &Path,
) -> Result<Option<MutationRules>, InfrastructureError> {
    if let Some(path) = cli_file {
        debug!(source = "cli", path = ?path, "Using mutation rules");
        return load_mutation_rules(path).map(Some);
    }
    if let Some(file) = &environment.mutations_file {
        let path = project_dir.join(file);
        debug!(source = "environment file", path = ?path, "Using mutation rules");
        return load_mutation_rules(&path).map(Some);
    }
    if let Some(inline) = &environment.mutations {
        debug!(source = "inline", "Using mutation rules");
        return Ok(Some(inline.clone()));
    }
    Ok(None)
}

/// Configured rules, else the platform-instance mapping the exporter
/// embedded, else no rules at all.
///
/// Configured rules are returned as-is and validated strictly by the
/// engine. Embedded rules come with the input file: invalid ones are
/// dropped and returned alongside the rules that remain.
pub fn effective_rules(
    configured: Option<MutationRules>,
    export: &ExportMetadata,
) -> (MutationRules, Vec<DomainError>) {
    if let Some(rules) = configured {
        return (rules, Vec::new());
    }
    let Some(mut embedded) = export.embedded_rules() else {
        return (MutationRules::default(), Vec::new());
    };
    debug!(source = "export metadata", "Using mutation rules");
    let dropped = embedded.drop_invalid();
    for error in &dropped {
        warn!(error = %error, "Dropping embedded mutation rule");
    }
    (embedded, dropped)
}
