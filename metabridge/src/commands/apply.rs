// metabridge/src/commands/apply.rs
//
// USE CASE: Submit the output of an earlier dry run.

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

use metabridge_core::application::apply_task_dir;
use metabridge_core::infrastructure::adapters::connect;

pub async fn execute(
    from: PathBuf,
    target_env: String,
    config: Option<PathBuf>,
    project_dir: PathBuf,
) -> anyhow::Result<()> {
    let (config, base_dir) = super::load_config(&project_dir, config.as_deref())?;
    let catalog = connect(&config, &target_env, &base_dir)
        .with_context(|| format!("Failed to connect to target environment '{}'", target_env))?;

    let report = apply_task_dir(
        catalog.as_ref(),
        &from,
        Duration::from_secs(config.emit.timeout_secs),
    )
    .await
    .with_context(|| format!("Failed to replay {:?}", from))?;

    println!(
        "\n📊 {} change proposals emitted, {} failed",
        report.emitted,
        report.failures.len()
    );
    if report.has_failures() {
        for failure in &report.failures {
            eprintln!(
                "   ❌ {} [{}]: {}",
                failure.entity_urn, failure.aspect, failure.reason
            );
        }
        std::process::exit(1);
    }
    println!("✨ SUCCESS!");
    Ok(())
}
