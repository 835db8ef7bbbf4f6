// metabridge-core/src/infrastructure/export.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::domain::mutation::MutationRules;
use crate::infrastructure::error::InfrastructureError;

/// Which of the accepted layouts the export file used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportShape {
    /// `{"metadata": {...}, "entities": [...]}`
    Enveloped,
    /// `{"entities": [...]}`
    Entities,
    /// `{"export_data": [...]}`
    ExportData,
    /// `[...]`
    List,
    /// A single entity object.
    Single,
}

impl ExportShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enveloped => "metadata+entities",
            Self::Entities => "entities",
            Self::ExportData => "export_data",
            Self::List => "list",
            Self::Single => "single entity",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportMutationConfig {
    #[serde(default)]
    pub platform_instance_mapping: indexmap::IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportMetadata {
    #[serde(default)]
    pub environment: Option<String>,
    /// Entity urns in the export were already rewritten for the target.
    #[serde(default)]
    pub mutations_applied: bool,
    #[serde(default)]
    pub mutation_config: Option<ExportMutationConfig>,
}

impl ExportMetadata {
    /// Platform-instance rules embedded by the exporter, if any.
    pub fn embedded_rules(&self) -> Option<MutationRules> {
        let mapping = &self.mutation_config.as_ref()?.platform_instance_mapping;
        if mapping.is_empty() {
            return None;
        }
        Some(MutationRules {
            platform_instances: mapping.clone(),
            ..MutationRules::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub shape: ExportShape,
    pub metadata: ExportMetadata,
    /// Raw entities, unvalidated. Nulls and malformed entries are kept so
    /// they can be reported with their position.
    pub entities: Vec<Value>,
}

#[instrument]
pub fn load_export(path: &Path) -> Result<ExportDocument, InfrastructureError> {
    let content = fs::read_to_string(path).map_err(|e| InfrastructureError::ExportLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let document = parse_export(&content).map_err(|reason| InfrastructureError::ExportLoad {
        path: path.display().to_string(),
        reason,
    })?;
    info!(
        shape = document.shape.as_str(),
        entities = document.entities.len(),
        mutations_applied = document.metadata.mutations_applied,
        "Export loaded"
    );
    Ok(document)
}

pub fn parse_export(content: &str) -> Result<ExportDocument, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;

    match value {
        Value::Array(entities) => Ok(ExportDocument {
            shape: ExportShape::List,
            metadata: ExportMetadata::default(),
            entities,
        }),
        Value::Object(mut map) => {
            let metadata = match map.remove("metadata") {
                Some(Value::Null) | None => None,
                Some(raw) => Some(
                    serde_json::from_value::<ExportMetadata>(raw)
                        .map_err(|e| format!("invalid 'metadata': {}", e))?,
                ),
            };

            let (shape, list) = if let Some(list) = map.remove("entities") {
                let shape = if metadata.is_some() {
                    ExportShape::Enveloped
                } else {
                    ExportShape::Entities
                };
                (shape, list)
            } else if let Some(list) = map.remove("export_data") {
                (ExportShape::ExportData, list)
            } else {
                if metadata.is_some() {
                    return Err("'metadata' given without 'entities'".to_string());
                }
                return Ok(ExportDocument {
                    shape: ExportShape::Single,
                    metadata: ExportMetadata::default(),
                    entities: vec![Value::Object(map)],
                });
            };

            let entities = match list {
                Value::Array(entities) => entities,
                Value::Null => Vec::new(),
                _ => return Err("entity list is not an array".to_string()),
            };
            Ok(ExportDocument {
                shape,
                metadata: metadata.unwrap_or_default(),
                entities,
            })
        }
        _ => Err("expected a JSON object or array".to_string()),
    }
}
