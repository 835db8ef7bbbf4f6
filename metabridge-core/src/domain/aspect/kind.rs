// metabridge-core/src/domain/aspect/kind.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of aspects the migration knows how to carry over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectKind {
    #[serde(rename = "globalTags")]
    GlobalTags,
    #[serde(rename = "glossaryTerms")]
    GlossaryTerms,
    #[serde(rename = "domains")]
    Domains,
    #[serde(rename = "structuredProperties")]
    StructuredProperties,
    #[serde(rename = "editableSchemaFieldInfo")]
    EditableSchemaFieldInfo,
}

impl AspectKind {
    /// Build order for one matched entity.
    pub const ALL: [AspectKind; 5] = [
        Self::GlobalTags,
        Self::GlossaryTerms,
        Self::Domains,
        Self::StructuredProperties,
        Self::EditableSchemaFieldInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlobalTags => "globalTags",
            Self::GlossaryTerms => "glossaryTerms",
            Self::Domains => "domains",
            Self::StructuredProperties => "structuredProperties",
            Self::EditableSchemaFieldInfo => "editableSchemaFieldInfo",
        }
    }

    /// Field-level aspects produce one task per schema field.
    pub fn is_field_level(&self) -> bool {
        matches!(self, Self::EditableSchemaFieldInfo)
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown aspect '{}'. Expected one of: globalTags, glossaryTerms, domains, structuredProperties, editableSchemaFieldInfo.",
                    s
                )
            })
    }
}
