// metabridge-core/src/domain/aspect/payload.rs
//
// Aspect payloads in the catalog's wire shape (camelCase JSON).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::aspect::kind::AspectKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// Epoch milliseconds.
    pub time: i64,
    pub actor: String,
}

impl AuditStamp {
    pub fn now(actor: &str) -> Self {
        Self {
            time: chrono::Utc::now().timestamp_millis(),
            actor: actor.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAssociation {
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalTags {
    pub tags: Vec<TagAssociation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTermAssociation {
    pub urn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerms {
    pub terms: Vec<GlossaryTermAssociation>,
    pub audit_stamp: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domains {
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyValue {
    String(String),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredPropertyAssignment {
    pub property_urn: String,
    pub values: Vec<PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProperties {
    pub properties: Vec<StructuredPropertyAssignment>,
}

/// Annotation of a single schema field. Exactly one of tags/terms is set
/// per change proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableSchemaFieldInfo {
    pub field_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_tags: Option<GlobalTags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary_terms: Option<GlossaryTerms>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AspectPayload {
    GlobalTags(GlobalTags),
    GlossaryTerms(GlossaryTerms),
    Domains(Domains),
    StructuredProperties(StructuredProperties),
    EditableSchemaFieldInfo(EditableSchemaFieldInfo),
}

impl AspectPayload {
    pub fn kind(&self) -> AspectKind {
        match self {
            Self::GlobalTags(_) => AspectKind::GlobalTags,
            Self::GlossaryTerms(_) => AspectKind::GlossaryTerms,
            Self::Domains(_) => AspectKind::Domains,
            Self::StructuredProperties(_) => AspectKind::StructuredProperties,
            Self::EditableSchemaFieldInfo(_) => AspectKind::EditableSchemaFieldInfo,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::GlobalTags(p) => serde_json::to_value(p),
            Self::GlossaryTerms(p) => serde_json::to_value(p),
            Self::Domains(p) => serde_json::to_value(p),
            Self::StructuredProperties(p) => serde_json::to_value(p),
            Self::EditableSchemaFieldInfo(p) => serde_json::to_value(p),
        }
    }

    /// Decodes a payload whose kind is carried next to it (aspect name).
    pub fn from_value(kind: AspectKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            AspectKind::GlobalTags => Self::GlobalTags(serde_json::from_value(value)?),
            AspectKind::GlossaryTerms => Self::GlossaryTerms(serde_json::from_value(value)?),
            AspectKind::Domains => Self::Domains(serde_json::from_value(value)?),
            AspectKind::StructuredProperties => {
                Self::StructuredProperties(serde_json::from_value(value)?)
            }
            AspectKind::EditableSchemaFieldInfo => {
                Self::EditableSchemaFieldInfo(serde_json::from_value(value)?)
            }
        })
    }

    /// Every urn the payload points at (tags, terms, domains, properties).
    pub fn referenced_urns(&self) -> Vec<&str> {
        fn tag_urns(tags: &GlobalTags) -> impl Iterator<Item = &str> {
            tags.tags.iter().map(|t| t.tag.as_str())
        }
        fn term_urns(terms: &GlossaryTerms) -> impl Iterator<Item = &str> {
            terms.terms.iter().map(|t| t.urn.as_str())
        }

        match self {
            Self::GlobalTags(p) => tag_urns(p).collect(),
            Self::GlossaryTerms(p) => term_urns(p).collect(),
            Self::Domains(p) => p.domains.iter().map(String::as_str).collect(),
            Self::StructuredProperties(p) => p
                .properties
                .iter()
                .map(|a| a.property_urn.as_str())
                .collect(),
            Self::EditableSchemaFieldInfo(p) => p
                .global_tags
                .iter()
                .flat_map(tag_urns)
                .chain(p.glossary_terms.iter().flat_map(term_urns))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() -> Result<()> {
        let tags = AspectPayload::GlobalTags(GlobalTags {
            tags: vec![TagAssociation {
                tag: "urn:li:tag:pii".to_string(),
            }],
        });
        assert_eq!(tags.to_value()?, json!({"tags": [{"tag": "urn:li:tag:pii"}]}));

        let props = AspectPayload::StructuredProperties(StructuredProperties {
            properties: vec![StructuredPropertyAssignment {
                property_urn: "urn:li:structuredProperty:retention".to_string(),
                values: vec![PropertyValue::Double(30.0), PropertyValue::String("days".into())],
            }],
        });
        assert_eq!(
            props.to_value()?,
            json!({"properties": [{
                "propertyUrn": "urn:li:structuredProperty:retention",
                "values": [{"double": 30.0}, {"string": "days"}]
            }]})
        );
        Ok(())
    }

    #[test]
    fn test_field_payload_omits_absent_annotation() -> Result<()> {
        let field = AspectPayload::EditableSchemaFieldInfo(EditableSchemaFieldInfo {
            field_path: "email".to_string(),
            global_tags: Some(GlobalTags {
                tags: vec![TagAssociation {
                    tag: "urn:li:tag:pii".to_string(),
                }],
            }),
            glossary_terms: None,
        });
        let value = field.to_value()?;
        assert_eq!(
            value,
            json!({"fieldPath": "email", "globalTags": {"tags": [{"tag": "urn:li:tag:pii"}]}})
        );
        assert_eq!(
            AspectPayload::from_value(AspectKind::EditableSchemaFieldInfo, value)?,
            field
        );
        assert_eq!(field.referenced_urns(), vec!["urn:li:tag:pii"]);
        Ok(())
    }

    #[test]
    fn test_wrong_shape_for_kind_is_rejected() {
        let result = AspectPayload::from_value(AspectKind::Domains, json!({"tags": []}));
        assert!(result.is_err());
    }
}
