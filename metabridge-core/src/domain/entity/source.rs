// metabridge-core/src/domain/entity/source.rs

use serde_json::Value;

use crate::domain::browse_path::BrowsePathNormalizer;
use crate::domain::entity::accessor::first_str;
use crate::domain::entity::urn;
use crate::domain::error::DomainError;

/// Immutable snapshot of one exported entity.
///
/// Identity fields are resolved once at load time. Aspect data (tags, terms,
/// domain, structured properties, schema fields) stays in `raw` and is read
/// through the aspect extractor, so a malformed aspect only costs that one
/// change proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntityRecord {
    pub urn: String,
    /// Lowercased, e.g. `dataset`.
    pub entity_type: String,
    /// Lowercased platform name, empty when the export carries none.
    pub platform: String,
    pub platform_instance: Option<String>,
    /// Normalized browse path, platform instance first. Not mutated.
    pub path_components: Vec<String>,
    pub name: String,
    pub raw: Value,
}

impl SourceEntityRecord {
    pub fn from_snapshot(index: usize, raw: Value) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidRecord {
            index,
            reason: reason.to_string(),
        };

        if !raw.is_object() {
            return Err(invalid(if raw.is_null() {
                "record is null"
            } else {
                "record is not an object"
            }));
        }

        let urn = first_str(&raw, &[&["urn"]])
            .ok_or_else(|| invalid("missing string 'urn'"))?
            .to_string();

        let entity_type = first_str(&raw, &[&["type"], &["entityType"]])
            .or_else(|| urn::entity_type(&urn))
            .map(urn::entity_type_key)
            .ok_or_else(|| invalid("cannot determine entity type"))?;

        let name = first_str(&raw, &[&["name"], &["properties", "name"]])
            .map(str::to_string)
            .or_else(|| {
                urn::qualified_name(&urn)
                    .and_then(|qualified| qualified.rsplit('.').next())
                    .map(str::to_string)
            })
            .ok_or_else(|| invalid("missing entity name"))?;

        let platform = first_str(
            &raw,
            &[&["platform", "name"], &["platform", "urn"], &["platform"]],
        )
        .map(urn::platform_name)
        .or_else(|| urn::platform(&urn))
        .unwrap_or_default()
        .to_lowercase();

        let platform_instance = BrowsePathNormalizer::platform_instance(&raw);
        let path_components = BrowsePathNormalizer::components(&raw);

        Ok(Self {
            urn,
            entity_type,
            platform,
            platform_instance,
            path_components,
            name,
            raw,
        })
    }

    /// Path components after the platform instance.
    pub fn browse_segments(&self) -> &[String] {
        match self.platform_instance {
            Some(_) => self.path_components.get(1..).unwrap_or_default(),
            None => &self.path_components,
        }
    }
}

/// Splits raw export entities into valid records and validation warnings.
/// Input order is preserved for the valid records.
pub fn partition_records(entities: Vec<Value>) -> (Vec<SourceEntityRecord>, Vec<DomainError>) {
    let mut valid = Vec::with_capacity(entities.len());
    let mut rejected = Vec::new();

    for (index, raw) in entities.into_iter().enumerate() {
        match SourceEntityRecord::from_snapshot(index, raw) {
            Ok(record) => valid.push(record),
            Err(e) => rejected.push(e),
        }
    }

    (valid, rejected)
}
