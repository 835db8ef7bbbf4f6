// metabridge-core/src/infrastructure/task_files.rs

// On-disk form of a change proposal, as written by a dry run and read
// back by `apply`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::domain::aspect::{AspectKind, AspectPayload, ChangeType, McpTask};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json;

const INDEX_SEPARATOR: &str = "__";

fn re_unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[^A-Za-z0-9._-]+")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTaskFile {
    pub entity_urn: String,
    pub aspect_name: AspectKind,
    #[serde(default)]
    pub change_type: ChangeType,
    pub payload: Value,
    #[serde(default)]
    pub source_urns: Vec<String>,
}

impl McpTaskFile {
    pub fn from_task(task: &McpTask) -> Result<Self, InfrastructureError> {
        Ok(Self {
            entity_urn: task.entity_urn.clone(),
            aspect_name: task.aspect(),
            change_type: task.change_type,
            payload: task.payload.to_value()?,
            source_urns: task.source_urns.clone(),
        })
    }

    pub fn into_task(self) -> Result<McpTask, InfrastructureError> {
        let payload = AspectPayload::from_value(self.aspect_name, self.payload)?;
        Ok(McpTask {
            entity_urn: self.entity_urn,
            payload,
            change_type: self.change_type,
            source_urns: self.source_urns,
        })
    }
}

/// `<sanitized urn>__<index>.json`
pub fn task_file_name(entity_urn: &str, index: usize) -> String {
    let stem = re_unsafe_chars().replace_all(entity_urn, "_");
    format!("{}{}{}.json", stem, INDEX_SEPARATOR, index)
}

pub fn write_task_file(
    dir: &Path,
    index: usize,
    task: &McpTask,
) -> Result<PathBuf, InfrastructureError> {
    let path = dir.join(task_file_name(&task.entity_urn, index));
    write_json(&path, &McpTaskFile::from_task(task)?)?;
    Ok(path)
}

/// (stem, index) when the file name follows the task naming scheme.
fn parse_task_file_name(path: &Path) -> Option<(String, usize)> {
    if path.extension().is_none_or(|ext| ext != "json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (prefix, index) = stem.rsplit_once(INDEX_SEPARATOR)?;
    Some((prefix.to_string(), index.parse().ok()?))
}

/// Reads every task file directly under `dir` (reports such as
/// `summary.json` are ignored), ordered by entity then index.
pub fn read_task_dir(dir: &Path) -> Result<Vec<McpTask>, InfrastructureError> {
    if !dir.is_dir() {
        return Err(InfrastructureError::ConfigError(format!(
            "Task directory {:?} does not exist",
            dir
        )));
    }

    let mut found: Vec<((String, usize), PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file()
            && let Some(key) = parse_task_file_name(path)
        {
            found.push((key, path.to_path_buf()));
        }
    }
    found.sort();

    found
        .into_iter()
        .map(|(_, path)| {
            let content = fs::read_to_string(&path)?;
            let file: McpTaskFile = serde_json::from_str(&content)?;
            file.into_task()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aspect::payload::{Domains, GlobalTags, TagAssociation};
    use anyhow::Result;
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
                vec![URN.to_string(), "urn:li:tag:pii".to_string()],
            ),
            McpTask::new(
                URN.to_string(),
                AspectPayload::Domains(Domains {
                    domains: vec!["urn:li:domain:sales".to_string()],
                }),
                vec![URN.to_string(), "urn:li:domain:sales".to_string()],
            ),
        ]
    }

    #[test]
    fn test_file_name_is_sanitized() {
        assert_eq!(
            task_file_name(URN, 3),
            "urn_li_dataset_urn_li_dataPlatform_mysql_xyz.sales.orders_PROD___3.json"
        );
    }

    #[test]
    fn test_round_trip_preserves_tasks() -> Result<()> {
        let dir = tempdir()?;
        let written = tasks();
        for (i, task) in written.iter().enumerate() {
            write_task_file(dir.path(), i, task)?;
        }
        // Reports in the same directory are not task files
        write_json(dir.path().join("summary.json"), &serde_json::json!({}))?;

        let read = read_task_dir(dir.path())?;
        assert_eq!(read, written);
        Ok(())
    }

    #[test]
    fn test_file_carries_upsert_change_type() -> Result<()> {
        let dir = tempdir()?;
        let path = write_task_file(dir.path(), 0, &tasks()[0])?;
        let raw: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
        assert_eq!(raw["changeType"], "upsert");
        assert_eq!(raw["aspectName"], "globalTags");
        assert_eq!(raw["entityUrn"], URN);
        Ok(())
    }

    #[test]
    fn test_index_order_is_numeric() -> Result<()> {
        let dir = tempdir()?;
        let task = &tasks()[0];
        for i in [10, 2, 1] {
            write_task_file(dir.path(), i, task)?;
        }
        let mut keys: Vec<usize> = fs::read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .filter_map(|e| parse_task_file_name(&e.path()).map(|(_, i)| i))
            .collect();
        keys.sort();
        assert_eq!(keys, vec![1, 2, 10]);
        assert_eq!(read_task_dir(dir.path())?.len(), 3);
        Ok(())
    }
}
