// metabridge-core/src/infrastructure/config/project.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["metabridge.yaml", "metabridge_project_conf.yaml"];

/// Loads the project configuration: an explicit file when given, otherwise
/// the first known file name found in `project_dir`.
#[instrument(skip(project_dir))]
pub fn load_project_config(
    project_dir: &Path,
    explicit: Option<&Path>,
) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Discovery
    let config_path = match explicit {
        Some(path) if path.exists() => path.to_path_buf(),
        Some(path) => {
            return Err(InfrastructureError::ConfigNotFound(
                path.display().to_string(),
            ));
        }
        None => find_main_config(project_dir)?,
    };
    info!(path = ?config_path, "Loading project configuration");

    // 2. YAML
    let content = fs::read_to_string(&config_path)?;
    let mut config: ProjectConfig = serde_yaml::from_str(&content)?;

    // 3. Layering
    apply_env_overrides(&mut config);

    // 4. Validation, after overrides so they are checked too
    config.validate().map_err(|e| {
        InfrastructureError::ConfigError(format!("Invalid {:?}: {}", config_path, e))
    })?;

    Ok(config)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "{:?} (checked {:?})",
        root, CONFIG_CANDIDATES
    )))
}

fn apply_env_overrides(config: &mut ProjectConfig) {
    if let Ok(val) = std::env::var("METABRIDGE_OUTPUT_PATH") {
        info!(old = ?config.output_path, new = ?val, "Overriding output path via ENV");
        config.output_path = val;
    }
    // Only environments that already talk to a server are redirected.
    if let Ok(val) = std::env::var("METABRIDGE_SERVER") {
        for (name, env) in config.environments.iter_mut() {
            if env.server.is_some() {
                info!(environment = %name, new = ?val, "Overriding server via ENV");
                env.server = Some(val.clone());
            }
        }
    }
}
