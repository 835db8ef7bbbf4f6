// metabridge/src/commands/mod.rs

pub mod apply;
pub mod inspect;
pub mod migrate;

use anyhow::Context;
use std::path::{Path, PathBuf};

use metabridge_core::infrastructure::config::{ProjectConfig, load_project_config};

/// Loads the project configuration. Relative paths inside it resolve
/// against the returned directory: the config file's own directory when
/// given explicitly, the project directory otherwise.
pub(crate) fn load_config(
    project_dir: &Path,
    config: Option<&Path>,
) -> anyhow::Result<(ProjectConfig, PathBuf)> {
    println!("⚙️  Loading configuration...");
    let loaded = load_project_config(project_dir, config).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            config.unwrap_or(project_dir)
        )
    })?;
    println!("   Project: {}", loaded.name);

    let base_dir = config
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project_dir.to_path_buf());
    Ok((loaded, base_dir))
}
