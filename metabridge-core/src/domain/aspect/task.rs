// metabridge-core/src/domain/aspect/task.rs

use serde::{Deserialize, Serialize};

use crate::domain::aspect::kind::AspectKind;
use crate::domain::aspect::payload::AspectPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Replace the aspect: re-submitting converges to the same state.
    #[default]
    Upsert,
}

/// One aspect-level change proposal for one target entity. Created once,
/// then emitted or discarded, never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct McpTask {
    /// Urn of the entity in the target environment: the urn of the matched
    /// target record, which already carries target-side identifiers. The
    /// entity-urn-mode rewrite of the source urn is reported separately as
    /// `mutated_urn` in the match report.
    pub entity_urn: String,
    pub payload: AspectPayload,
    pub change_type: ChangeType,
    /// Pre-mutation urns this task was derived from (entity first, then
    /// the referenced tags/terms/domains/properties).
    pub source_urns: Vec<String>,
}

impl McpTask {
    pub fn new(entity_urn: String, payload: AspectPayload, source_urns: Vec<String>) -> Self {
        Self {
            entity_urn,
            payload,
            change_type: ChangeType::Upsert,
            source_urns,
        }
    }

    pub fn aspect(&self) -> AspectKind {
        self.payload.kind()
    }

    pub fn aspect_name(&self) -> &'static str {
        self.payload.kind().as_str()
    }
}
