// metabridge-core/src/infrastructure/adapters/mod.rs

pub mod datahub;
pub mod snapshot;

use std::path::Path;
use tracing::{info, warn};

use crate::domain::project::{EnvironmentConfig, ProjectConfig};
use crate::infrastructure::error::InfrastructureError;
use crate::ports::catalog::TargetCatalog;

pub use datahub::DataHubCatalog;
pub use snapshot::SnapshotCatalog;

/// Resolves a named environment of the project to the catalog backend it
/// points at. Snapshot paths are relative to `project_dir`.
pub fn connect(
    config: &ProjectConfig,
    env_name: &str,
    project_dir: &Path,
) -> Result<Box<dyn TargetCatalog>, InfrastructureError> {
    let env = environment(config, env_name)?;

    match (&env.server, &env.snapshot) {
        (Some(server), _) => {
            let token = env.token_env.as_deref().and_then(|var| match std::env::var(var) {
                Ok(token) => Some(token),
                Err(_) => {
                    warn!(variable = %var, "Token variable is not set, calling without auth");
                    None
                }
            });
            info!(environment = %env_name, server = %server, "Connecting to DataHub");
            Ok(Box::new(DataHubCatalog::new(server, token)?))
        }
        (None, Some(snapshot)) => {
            let catalog = SnapshotCatalog::from_file(&project_dir.join(snapshot))?;
            Ok(Box::new(catalog))
        }
        (None, None) => Err(InfrastructureError::ConfigError(format!(
            "Environment '{}' has neither 'server' nor 'snapshot'",
            env_name
        ))),
    }
}

pub fn environment<'c>(
    config: &'c ProjectConfig,
    env_name: &str,
) -> Result<&'c EnvironmentConfig, InfrastructureError> {
    config.environment(env_name).ok_or_else(|| {
        InfrastructureError::ConfigError(format!(
            "Unknown target environment '{}'. Known: {:?}",
            env_name,
            config.environment_names()
        ))
    })
}
