// metabridge-core/src/application/replay.rs

use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

use crate::application::emitter::{ChangeProposalEmitter, EmitReport};
use crate::error::MetabridgeError;
use crate::infrastructure::task_files::read_task_dir;
use crate::ports::catalog::TargetCatalog;

/// Submits the task files of an earlier dry run, with the same per-task
/// failure isolation as a live migration.
#[instrument(skip(catalog))]
pub async fn apply_task_dir(
    catalog: &dyn TargetCatalog,
    dir: &Path,
    timeout: Duration,
) -> Result<EmitReport, MetabridgeError> {
    println!("📂 Reading change proposals from {:?}...", dir);
    let tasks = read_task_dir(dir)?;
    info!(tasks = tasks.len(), "Replaying dry-run output");

    println!(
        "📤 Submitting {} change proposals to {}...",
        tasks.len(),
        catalog.backend_name()
    );
    ChangeProposalEmitter::live(catalog, timeout)
        .emit_all(&tasks)
        .await
}
