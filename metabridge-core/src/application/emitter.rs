// metabridge-core/src/application/emitter.rs

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::aspect::{AspectKind, McpTask};
use crate::error::MetabridgeError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::ensure_dir;
use crate::infrastructure::task_files::write_task_file;
use crate::ports::catalog::TargetCatalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmitFailure {
    pub entity_urn: String,
    pub aspect: AspectKind,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    /// Tasks written (dry run) or accepted by the catalog (live).
    pub emitted: usize,
    pub failures: Vec<EmitFailure>,
    /// Dry run only.
    pub files: Vec<PathBuf>,
}

impl EmitReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

enum Destination<'a> {
    Files(&'a Path),
    Catalog {
        catalog: &'a dyn TargetCatalog,
        timeout: Duration,
    },
}

/// Sends change proposals to files (dry run, no network) or to the target
/// catalog (live). One task failing never stops the rest of the batch.
pub struct ChangeProposalEmitter<'a> {
    destination: Destination<'a>,
}

impl<'a> ChangeProposalEmitter<'a> {
    pub fn dry_run(output_dir: &'a Path) -> Self {
        Self {
            destination: Destination::Files(output_dir),
        }
    }

    pub fn live(catalog: &'a dyn TargetCatalog, timeout: Duration) -> Self {
        Self {
            destination: Destination::Catalog { catalog, timeout },
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.destination, Destination::Files(_))
    }

    /// Fails only when the dry-run directory cannot be created.
    pub async fn emit_all(&self, tasks: &[McpTask]) -> Result<EmitReport, MetabridgeError> {
        let mut report = EmitReport::default();

        match &self.destination {
            Destination::Files(dir) => {
                ensure_dir(dir)?;
                let mut per_entity: HashMap<&str, usize> = HashMap::new();
                for task in tasks {
                    let index = per_entity.entry(task.entity_urn.as_str()).or_insert(0);
                    match write_task_file(dir, *index, task) {
                        Ok(path) => {
                            debug!(path = ?path, "Change proposal written");
                            report.emitted += 1;
                            report.files.push(path);
                        }
                        Err(e) => record_failure(&mut report, task, e.to_string()),
                    }
                    *index += 1;
                }
                info!(files = report.files.len(), dir = ?dir, "Dry run: change proposals written");
            }
            Destination::Catalog { catalog, timeout } => {
                for task in tasks {
                    match submit(*catalog, task, *timeout).await {
                        Ok(()) => {
                            debug!(entity = %task.entity_urn, aspect = %task.aspect(), "Change proposal accepted");
                            report.emitted += 1;
                        }
                        Err(e) => record_failure(&mut report, task, e.to_string()),
                    }
                }
                info!(
                    backend = catalog.backend_name(),
                    emitted = report.emitted,
                    failed = report.failures.len(),
                    "Change proposals submitted"
                );
            }
        }

        Ok(report)
    }
}

async fn submit(
    catalog: &dyn TargetCatalog,
    task: &McpTask,
    timeout: Duration,
) -> Result<(), MetabridgeError> {
    match tokio::time::timeout(timeout, catalog.emit(task)).await {
        Ok(result) => result,
        Err(_) => Err(InfrastructureError::Timeout {
            operation: format!("Emitting {}", task.aspect()),
            secs: timeout.as_secs(),
        }
        .into()),
    }
}

fn record_failure(report: &mut EmitReport, task: &McpTask, reason: String) {
    warn!(entity = %task.entity_urn, aspect = %task.aspect(), error = %reason, "Change proposal failed");
    report.failures.push(EmitFailure {
        entity_urn: task.entity_urn.clone(),
        aspect: task.aspect(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aspect::AspectPayload;
    use crate::domain::aspect::payload::{Domains, GlobalTags, TagAssociation};
    use crate::infrastructure::adapters::SnapshotCatalog;
    use crate::infrastructure::task_files::read_task_dir;
    use crate::ports::catalog::{SearchPage, SearchRequest};
    use anyhow::Result;
    use async_trait::async_trait;
    use tempfile::tempdir;

    const URN: &str = "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,PROD)";

    fn tasks() -> Vec<McpTask> {
        vec![
            McpTask::new(
                URN.to_string(),
                AspectPayload::GlobalTags(GlobalTags {
                    tags: vec![TagAssociation {
                        tag: "urn:li:tag:pii".to_string(),
                    }],
                }),
                vec![URN.to_string()],
            ),
            McpTask::new(
                URN.to_string(),
                AspectPayload::Domains(Domains {
                    domains: vec!["urn:li:domain:sales".to_string()],
                }),
                vec![URN.to_string()],
            ),
        ]
    }

    /// Rejects every `domains` proposal.
    struct PickyCatalog {
        inner: SnapshotCatalog,
    }

    #[async_trait]
    impl TargetCatalog for PickyCatalog {
        async fn search(&self, request: &SearchRequest) -> Result<SearchPage, MetabridgeError> {
            self.inner.search(request).await
        }
        async fn emit(&self, task: &McpTask) -> Result<(), MetabridgeError> {
            if task.aspect() == AspectKind::Domains {
                return Err(InfrastructureError::CatalogResponse("422".to_string()).into());
            }
            self.inner.emit(task).await
        }
        fn backend_name(&self) -> &'static str {
            "picky"
        }
    }

    #[tokio::test]
    async fn test_dry_run_writes_one_file_per_task() -> Result<()> {
        let dir = tempdir()?;
        let out = dir.path().join("mcp_output");
        let emitter = ChangeProposalEmitter::dry_run(&out);
        assert!(emitter.is_dry_run());

        let report = emitter.emit_all(&tasks()).await?;
        assert_eq!(report.emitted, 2);
        assert_eq!(report.files.len(), 2);
        assert!(!report.has_failures());
        assert!(
            report
                .files
                .iter()
                .any(|f| f.to_string_lossy().ends_with("__1.json"))
        );

        // Round trip through the files reproduces the tasks
        assert_eq!(read_task_dir(&out)?, tasks());
        Ok(())
    }

    #[tokio::test]
    async fn test_live_failure_does_not_abort_batch() -> Result<()> {
        let catalog = PickyCatalog {
            inner: SnapshotCatalog::default(),
        };
        let mut batch = tasks();
        batch.push(batch[0].clone());

        let report = ChangeProposalEmitter::live(&catalog, Duration::from_secs(5))
            .emit_all(&batch)
            .await?;
        assert_eq!(report.emitted, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].aspect, AspectKind::Domains);
        assert_eq!(catalog.inner.emitted().len(), 2);
        Ok(())
    }
}
