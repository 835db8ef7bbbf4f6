// metabridge-core/src/domain/entity/target.rs

use serde::{Deserialize, Serialize};

use crate::domain::entity::urn;

/// Read-only candidate fetched from the target catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetEntityRecord {
    pub urn: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub platform: String,
    pub name: String,
    /// Empty for entities returned by the target catalog's search.
    #[serde(default)]
    pub browse_path: String,
}

impl TargetEntityRecord {
    /// Lowercased platform name, whether stored bare or as a platform urn.
    pub fn platform_name(&self) -> String {
        urn::platform_name(&self.platform).to_lowercase()
    }
}
