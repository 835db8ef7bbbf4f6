// metabridge-core/src/infrastructure/adapters/snapshot.rs

use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::domain::aspect::McpTask;
use crate::domain::entity::{TargetEntityRecord, urn};
use crate::error::MetabridgeError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::catalog::{
    FilterCondition, FilterCriterion, SearchPage, SearchRequest, TargetCatalog,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    List(Vec<TargetEntityRecord>),
    Wrapped { entities: Vec<TargetEntityRecord> },
}

/// Offline target catalog backed by a JSON list of entities. Searches are
/// answered locally and emitted proposals are kept in memory.
#[derive(Clone, Default)]
pub struct SnapshotCatalog {
    entities: Vec<TargetEntityRecord>,
    emitted: Arc<Mutex<Vec<McpTask>>>,
}

impl SnapshotCatalog {
    pub fn new(entities: Vec<TargetEntityRecord>) -> Self {
        Self {
            entities,
            emitted: Arc::default(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, InfrastructureError> {
        let content = fs::read_to_string(path)?;
        let entities = match serde_json::from_str(&content)? {
            SnapshotFile::List(entities) | SnapshotFile::Wrapped { entities } => entities,
        };
        info!(path = ?path, entities = entities.len(), "Target snapshot loaded");
        Ok(Self::new(entities))
    }

    pub fn emitted(&self) -> Vec<McpTask> {
        self.emitted
            .lock()
            .map(|tasks| tasks.clone())
            .unwrap_or_default()
    }

    fn matches(entity: &TargetEntityRecord, request: &SearchRequest) -> bool {
        let entity_type = urn::entity_type_key(&entity.entity_type);
        let type_ok = request.entity_types.is_empty()
            || request
                .entity_types
                .iter()
                .any(|t| urn::entity_type_key(t) == entity_type);

        let query = request.query.trim();
        let query_ok = query.is_empty()
            || query == "*"
            || entity.name.to_lowercase().contains(&query.to_lowercase());

        let filters_ok = request.or_filters.is_empty()
            || request
                .or_filters
                .iter()
                .any(|group| group.iter().all(|c| Self::criterion_holds(entity, c)));

        type_ok && query_ok && filters_ok
    }

    fn criterion_holds(entity: &TargetEntityRecord, criterion: &FilterCriterion) -> bool {
        let haystacks = [entity.browse_path.as_str(), entity.name.as_str()];
        criterion.values.iter().any(|value| match criterion.condition {
            FilterCondition::Contain => haystacks.iter().any(|h| h.contains(value.as_str())),
            FilterCondition::Equal => haystacks.contains(&value.as_str()),
        })
    }
}

#[async_trait]
impl TargetCatalog for SnapshotCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, MetabridgeError> {
        let hits: Vec<&TargetEntityRecord> = self
            .entities
            .iter()
            .filter(|e| Self::matches(e, request))
            .collect();
        Ok(SearchPage {
            total: hits.len(),
            entities: hits.into_iter().take(request.count).cloned().collect(),
        })
    }

    async fn emit(&self, task: &McpTask) -> Result<(), MetabridgeError> {
        let mut emitted = self.emitted.lock().map_err(|_| {
            MetabridgeError::InternalError("Snapshot emit log poisoned".to_string())
        })?;
        emitted.push(task.clone());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "snapshot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;

    fn target(name: &str, entity_type: &str) -> TargetEntityRecord {
        TargetEntityRecord {
            urn: format!("urn:li:{}:(urn:li:dataPlatform:mysql,{},PROD)", entity_type, name),
            entity_type: entity_type.to_string(),
            platform: "mysql".to_string(),
            name: name.to_string(),
            browse_path: String::new(),
        }
    }

    fn catalog() -> SnapshotCatalog {
        SnapshotCatalog::new(vec![
            target("xyz.sales.orders", "dataset"),
            target("orders", "dataset"),
            target("orders_chart", "chart"),
        ])
    }

    #[tokio::test]
    async fn test_type_filter_and_wildcard() -> Result<()> {
        let page = catalog()
            .search(&SearchRequest {
                query: "*".to_string(),
                entity_types: vec!["dataset".to_string()],
                count: 1000,
                ..SearchRequest::default()
            })
            .await?;
        assert_eq!(page.entities.len(), 2);
        assert!(!page.is_truncated());
        Ok(())
    }

    #[tokio::test]
    async fn test_type_filter_ignores_spelling() -> Result<()> {
        let catalog =
            SnapshotCatalog::new(vec![target("load", "dataJob"), target("orders", "dataset")]);
        let page = catalog
            .search(&SearchRequest {
                query: "*".to_string(),
                entity_types: vec!["datajob".to_string()],
                count: 1000,
                ..SearchRequest::default()
            })
            .await?;
        assert_eq!(page.entities.len(), 1);
        assert_eq!(page.entities[0].name, "load");
        Ok(())
    }

    #[tokio::test]
    async fn test_or_filters_use_containment() -> Result<()> {
        let request = SearchRequest {
            query: "*".to_string(),
            or_filters: vec![vec![FilterCriterion::contains(
                "browsePathV2",
                vec!["xyz".to_string(), "nothing".to_string()],
            )]],
            count: 1000,
            ..SearchRequest::default()
        };
        let page = catalog().search(&request).await?;
        assert_eq!(page.entities.len(), 1);
        assert_eq!(page.entities[0].name, "xyz.sales.orders");
        Ok(())
    }

    #[tokio::test]
    async fn test_page_size_truncates() -> Result<()> {
        let page = catalog()
            .search(&SearchRequest {
                query: "*".to_string(),
                count: 1,
                ..SearchRequest::default()
            })
            .await?;
        assert_eq!(page.entities.len(), 1);
        assert_eq!(page.total, 3);
        assert!(page.is_truncated());
        Ok(())
    }

    #[tokio::test]
    async fn test_emit_is_recorded() -> Result<()> {
        let catalog = catalog();
        let task = McpTask::new(
            "urn:li:dataset:x".to_string(),
            crate::domain::aspect::AspectPayload::Domains(
                crate::domain::aspect::payload::Domains {
                    domains: vec!["urn:li:domain:sales".to_string()],
                },
            ),
            vec![],
        );
        catalog.emit(&task).await?;
        assert_eq!(catalog.emitted(), vec![task]);
        Ok(())
    }

    #[test]
    fn test_from_file_accepts_list_and_wrapped() -> Result<()> {
        for content in [
            r#"[{"urn": "urn:li:dataset:a", "type": "dataset", "name": "a"}]"#,
            r#"{"entities": [{"urn": "urn:li:dataset:a", "type": "dataset", "name": "a"}]}"#,
        ] {
            let mut file = tempfile::NamedTempFile::new()?;
            file.write_all(content.as_bytes())?;
            let catalog = SnapshotCatalog::from_file(file.path())?;
            assert_eq!(catalog.entities.len(), 1);
        }
        Ok(())
    }
}
