// metabridge-core/src/ports/catalog.rs

// Contract with the target metadata catalog. The application layer only
// talks to this trait; DataHub and the offline snapshot plug in behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::aspect::McpTask;
use crate::domain::entity::TargetEntityRecord;
use crate::error::MetabridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterCondition {
    Contain,
    Equal,
}

/// One server-side facet filter: `field <condition> any of values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub field: String,
    pub values: Vec<String>,
    pub condition: FilterCondition,
}

impl FilterCriterion {
    pub fn contains(field: &str, values: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            values,
            condition: FilterCondition::Contain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchRequest {
    /// Free-text query, `*` for everything.
    pub query: String,
    /// Lowercase entity type names (`dataset`, `chart`...). Empty = any.
    pub entity_types: Vec<String>,
    /// Disjunction of conjunctions: an entity matches when every criterion
    /// of at least one group holds.
    pub or_filters: Vec<Vec<FilterCriterion>>,
    /// Single page size; there is no pagination.
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub entities: Vec<TargetEntityRecord>,
    /// Total hits reported by the catalog.
    pub total: usize,
}

impl SearchPage {
    pub fn is_truncated(&self) -> bool {
        self.entities.len() < self.total
    }
}

#[async_trait]
pub trait TargetCatalog: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, MetabridgeError>;

    /// Submits one change proposal. Must be idempotent (replace, never append).
    async fn emit(&self, task: &McpTask) -> Result<(), MetabridgeError>;

    fn backend_name(&self) -> &'static str;
}
