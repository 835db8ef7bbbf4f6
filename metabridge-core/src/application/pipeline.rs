// metabridge-core/src/application/pipeline.rs

use indexmap::IndexSet;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::error::MetabridgeError;
use crate::ports::catalog::TargetCatalog;

// Application services
use crate::application::emitter::{ChangeProposalEmitter, EmitFailure};
use crate::application::search::{SearchParameters, StrategyReport, TargetSearchClient};

// Domain
use crate::domain::aspect::{AuditStamp, ChangeProposalBuilder, McpTask};
use crate::domain::entity::partition_records;
use crate::domain::matching::{EntityMatcher, MatchProvenance, MatchRecord};
use crate::domain::mutation::{MutationEngine, MutationRules};
use crate::domain::project::{EmitSettings, SearchSettings};

// Infrastructure
use crate::infrastructure::config::effective_rules;
use crate::infrastructure::export::load_export;
use crate::infrastructure::fs::{ensure_dir, write_json};

pub const MATCHES_FILE: &str = "matches.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Everything one migration run needs. Passed explicitly, nothing is read
/// from global state.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub input: PathBuf,
    pub target_env: String,
    /// Receives task files (dry run) and the match/summary reports.
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub search: SearchSettings,
    pub emit: EmitSettings,
    /// Configured rules. `None` falls back to the mapping in the export.
    pub mutations: Option<MutationRules>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationSummary {
    pub target_env: String,
    pub source_count: usize,
    pub target_count: usize,
    pub match_count: usize,
    pub task_count: usize,
    pub platforms: Vec<String>,
    pub entity_types: Vec<String>,
    pub invalid_count: usize,
    pub unmatched_count: usize,
    pub exact_matches: usize,
    pub name_only_matches: usize,
    pub aspect_failures: usize,
    pub search_degradations: usize,
    pub truncated_searches: usize,
    pub emitted: usize,
    pub emit_failures: usize,
    pub dry_run: bool,
    pub mutations_already_applied: bool,
    /// Invalid rules embedded in the export that were ignored.
    pub dropped_mutation_rules: usize,
    pub searches: Vec<StrategyReport>,
    pub failed_emits: Vec<EmitFailure>,
    pub generated_at: String,
}

impl MigrationSummary {
    /// Live runs fail when any proposal was rejected.
    pub fn has_emit_failures(&self) -> bool {
        self.emit_failures > 0
    }
}

/// Export -> validation -> search -> matching -> proposals -> emission.
///
/// Only an unreadable export, invalid mutation rules or an unwritable
/// output directory abort the run. Every other problem is counted in the
/// summary.
#[instrument(skip_all, fields(input = ?options.input, env = %options.target_env, dry_run = options.dry_run))]
pub async fn run_migration(
    catalog: &dyn TargetCatalog,
    options: &MigrationOptions,
) -> Result<MigrationSummary, MetabridgeError> {
    println!("🚀 Starting migration to '{}'...", options.target_env);
    let start_time = std::time::Instant::now();

    // 1. LOAD (fatal on failure)
    println!("📦 Loading export {:?}...", options.input);
    let document = load_export(&options.input)?;

    // 2. VALIDATE (non-fatal)
    let (sources, rejected) = partition_records(document.entities);
    for reason in &rejected {
        warn!(error = %reason, "Skipping source record");
    }
    println!(
        "   {} valid source entities, {} skipped",
        sources.len(),
        rejected.len()
    );

    let (rules, dropped_rules) = effective_rules(options.mutations.clone(), &document.metadata);
    if !dropped_rules.is_empty() {
        println!(
            "   ⚠️  {} invalid mutation rules in the export ignored",
            dropped_rules.len()
        );
    }
    let engine = MutationEngine::new(rules, document.metadata.mutations_applied)?;
    if engine.mutations_already_applied() {
        info!("Export urns already mutated, entity-urn mutation disabled");
    }

    // 3. SEARCH (degrades, never fails)
    println!("🔎 Searching target catalog ({})...", catalog.backend_name());
    let params = SearchParameters::derive(&sources, &engine);
    let client = TargetSearchClient::new(
        catalog,
        options.search.page_size,
        Duration::from_secs(options.search.timeout_secs),
    );
    let results = client.search(&params).await;
    for report in results.reports.iter().filter(|r| r.is_degraded()) {
        println!("   ⚠️  {} search failed, continuing without it", report.strategy);
    }
    for report in results.reports.iter().filter(|r| r.is_truncated()) {
        println!(
            "   ⚠️  {} search truncated: {} of {} results fetched",
            report.strategy, report.returned, report.total
        );
    }

    // 4. MATCH
    println!(
        "🧠 Matching {} source entities against {} targets...",
        sources.len(),
        results.entities.len()
    );
    let matcher = EntityMatcher::new(&results.entities);
    let outcome = matcher.match_all(&sources, &engine);

    // 5. BUILD PROPOSALS
    let builder = ChangeProposalBuilder::new(&engine, AuditStamp::now(&options.emit.actor));
    let mut tasks: Vec<McpTask> = Vec::new();
    let mut aspect_failures = 0;
    for matched in &outcome.matches {
        let built = builder.build(matched);
        aspect_failures += built.failures.len();
        tasks.extend(built.tasks);
    }
    println!(
        "📝 {} matches, {} change proposals ({} skipped)",
        outcome.matches.len(),
        tasks.len(),
        aspect_failures
    );

    // 6. EMIT
    ensure_dir(&options.output_dir)?;
    let emitter = if options.dry_run {
        ChangeProposalEmitter::dry_run(&options.output_dir)
    } else {
        ChangeProposalEmitter::live(catalog, Duration::from_secs(options.emit.timeout_secs))
    };
    let emit_report = emitter.emit_all(&tasks).await?;

    // 7. REPORTS
    let match_records: Vec<MatchRecord> =
        outcome.matches.iter().map(|m| m.to_record()).collect();
    write_json(options.output_dir.join(MATCHES_FILE), &match_records)?;

    let platforms: IndexSet<&str> = sources
        .iter()
        .map(|s| s.platform.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    let entity_types: IndexSet<&str> = sources.iter().map(|s| s.entity_type.as_str()).collect();

    let summary = MigrationSummary {
        target_env: options.target_env.clone(),
        source_count: sources.len(),
        target_count: results.entities.len(),
        match_count: outcome.matches.len(),
        task_count: tasks.len(),
        platforms: platforms.into_iter().map(str::to_string).collect(),
        entity_types: entity_types.into_iter().map(str::to_string).collect(),
        invalid_count: rejected.len(),
        unmatched_count: outcome.unmatched.len(),
        exact_matches: outcome.count_by(MatchProvenance::BrowsePathMatch),
        name_only_matches: outcome.count_by(MatchProvenance::NameOnlyMatch),
        aspect_failures,
        search_degradations: results.degradations(),
        truncated_searches: results.truncations(),
        emitted: emit_report.emitted,
        emit_failures: emit_report.failures.len(),
        dry_run: options.dry_run,
        mutations_already_applied: engine.mutations_already_applied(),
        dropped_mutation_rules: dropped_rules.len(),
        searches: results.reports.clone(),
        failed_emits: emit_report.failures,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };
    write_json(options.output_dir.join(SUMMARY_FILE), &summary)?;

    info!(
        sources = summary.source_count,
        targets = summary.target_count,
        matches = summary.match_count,
        tasks = summary.task_count,
        "Migration finished"
    );
    println!("✨ Migration finished in {:.2?}", start_time.elapsed());

    Ok(summary)
}
