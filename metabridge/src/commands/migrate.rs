// metabridge/src/commands/migrate.rs
//
// USE CASE: Match an export against a target environment and migrate its
// annotations.

use anyhow::Context;
use std::path::PathBuf;

use metabridge_core::application::{MigrationOptions, MigrationSummary, run_migration};
use metabridge_core::infrastructure::adapters::{connect, environment};
use metabridge_core::infrastructure::config::resolve_mutation_rules;

pub struct MigrateArgs {
    pub input: PathBuf,
    pub target_env: String,
    pub output_dir: Option<PathBuf>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
    pub mutations: Option<PathBuf>,
    pub project_dir: PathBuf,
}

pub async fn execute(args: MigrateArgs) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the config (infra)
    let (config, base_dir) = super::load_config(&args.project_dir, args.config.as_deref())?;
    let env = environment(&config, &args.target_env)?;
    let mutations = resolve_mutation_rules(args.mutations.as_deref(), env, &base_dir)
        .context("Failed to load mutation rules")?;

    // B. Instantiate the catalog adapter for the target environment
    let catalog = connect(&config, &args.target_env, &base_dir).with_context(|| {
        format!("Failed to connect to target environment '{}'", args.target_env)
    })?;
    println!("   Target: {} ({})", args.target_env, catalog.backend_name());

    // C. Run the pipeline (application layer)
    let options = MigrationOptions {
        input: args.input,
        target_env: args.target_env,
        output_dir: args
            .output_dir
            .unwrap_or_else(|| base_dir.join(&config.output_path)),
        dry_run: args.dry_run,
        search: config.search.clone(),
        emit: config.emit.clone(),
        mutations,
    };
    let summary = run_migration(catalog.as_ref(), &options)
        .await
        .with_context(|| format!("Migration of {:?} failed", options.input))?;

    print_summary(&summary);

    if !summary.dry_run && summary.has_emit_failures() {
        eprintln!(
            "\n❌ FAILURE. {} change proposals were rejected.",
            summary.emit_failures
        );
        std::process::exit(1);
    }
    println!("\n✨ SUCCESS! Finished in {:.2?}", start.elapsed());
    Ok(())
}

fn print_summary(summary: &MigrationSummary) {
    println!("\n📊 Summary");
    println!("   Sources:    {} ({} invalid)", summary.source_count, summary.invalid_count);
    println!(
        "   Targets:    {} ({} degraded, {} truncated searches)",
        summary.target_count, summary.search_degradations, summary.truncated_searches
    );
    println!(
        "   Matches:    {} ({} exact, {} name-only, {} unmatched)",
        summary.match_count,
        summary.exact_matches,
        summary.name_only_matches,
        summary.unmatched_count
    );
    println!(
        "   Proposals:  {} ({} skipped)",
        summary.task_count, summary.aspect_failures
    );
    let verb = if summary.dry_run { "written" } else { "emitted" };
    println!(
        "   {}: {} ({} failed)",
        verb, summary.emitted, summary.emit_failures
    );
    if !summary.platforms.is_empty() {
        println!("   Platforms:  {}", summary.platforms.join(", "));
    }
    if !summary.entity_types.is_empty() {
        println!("   Types:      {}", summary.entity_types.join(", "));
    }
}
