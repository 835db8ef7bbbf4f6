// metabridge-core/src/domain/aspect/builder.rs

use tracing::warn;

use crate::domain::aspect::extractor::{AspectExtractor, FieldAnnotations};
use crate::domain::aspect::kind::AspectKind;
use crate::domain::aspect::payload::{
    AspectPayload, AuditStamp, Domains, EditableSchemaFieldInfo, GlobalTags,
    GlossaryTermAssociation, GlossaryTerms, StructuredProperties, StructuredPropertyAssignment,
    TagAssociation,
};
use crate::domain::aspect::task::McpTask;
use crate::domain::error::DomainError;
use crate::domain::matching::EntityMatch;
use crate::domain::mutation::MutationEngine;

#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub tasks: Vec<McpTask>,
    /// One entry per skipped task.
    pub failures: Vec<DomainError>,
}

/// Builds the change proposals for a matched entity.
///
/// Only the source snapshot is inspected. Every reference urn placed in a
/// payload goes through search-token mutation, whether or not the export
/// was already mutated.
pub struct ChangeProposalBuilder<'e> {
    engine: &'e MutationEngine,
    audit: AuditStamp,
}

type Built = Result<McpTask, String>;

impl<'e> ChangeProposalBuilder<'e> {
    pub fn new(engine: &'e MutationEngine, audit: AuditStamp) -> Self {
        Self { engine, audit }
    }

    /// One task per populated entity-level aspect, plus one task per
    /// (schema field, annotation kind) pair.
    pub fn build(&self, matched: &EntityMatch<'_>) -> BuildOutcome {
        let mut outcome = BuildOutcome::default();

        for kind in AspectKind::ALL {
            let built: Vec<Built> = match kind {
                AspectKind::GlobalTags => {
                    self.global_tags(matched).transpose().into_iter().collect()
                }
                AspectKind::GlossaryTerms => self
                    .glossary_terms(matched)
                    .transpose()
                    .into_iter()
                    .collect(),
                AspectKind::Domains => self.domains(matched).transpose().into_iter().collect(),
                AspectKind::StructuredProperties => self
                    .structured_properties(matched)
                    .transpose()
                    .into_iter()
                    .collect(),
                AspectKind::EditableSchemaFieldInfo => self.schema_fields(matched),
            };

            for result in built {
                match result {
                    Ok(task) => outcome.tasks.push(task),
                    Err(reason) => {
                        let failure = DomainError::AspectBuild {
                            entity_urn: matched.source.urn.clone(),
                            aspect: kind.to_string(),
                            reason,
                        };
                        warn!(error = %failure, "Skipping change proposal");
                        outcome.failures.push(failure);
                    }
                }
            }
        }

        outcome
    }

    fn global_tags(&self, matched: &EntityMatch<'_>) -> Result<Option<McpTask>, String> {
        let urns = AspectExtractor::tags(&matched.source.raw)?;
        if urns.is_empty() {
            return Ok(None);
        }
        let payload = AspectPayload::GlobalTags(self.tag_payload(&urns));
        Ok(Some(self.task(matched, payload, &urns)))
    }

    fn glossary_terms(&self, matched: &EntityMatch<'_>) -> Result<Option<McpTask>, String> {
        let urns = AspectExtractor::glossary_terms(&matched.source.raw)?;
        if urns.is_empty() {
            return Ok(None);
        }
        let payload = AspectPayload::GlossaryTerms(self.term_payload(&urns));
        Ok(Some(self.task(matched, payload, &urns)))
    }

    fn domains(&self, matched: &EntityMatch<'_>) -> Result<Option<McpTask>, String> {
        let Some(domain) = AspectExtractor::domain(&matched.source.raw)? else {
            return Ok(None);
        };
        let payload = AspectPayload::Domains(Domains {
            domains: vec![self.engine.mutate_search_token(&domain)],
        });
        Ok(Some(self.task(matched, payload, &[domain])))
    }

    fn structured_properties(&self, matched: &EntityMatch<'_>) -> Result<Option<McpTask>, String> {
        let properties = AspectExtractor::structured_properties(&matched.source.raw)?;
        if properties.is_empty() {
            return Ok(None);
        }

        let references: Vec<String> = properties
            .iter()
            .map(|p| p.property_urn.clone())
            .collect();
        let payload = AspectPayload::StructuredProperties(StructuredProperties {
            properties: properties
                .into_iter()
                .map(|p| StructuredPropertyAssignment {
                    property_urn: self.engine.mutate_search_token(&p.property_urn),
                    values: p.values,
                })
                .collect(),
        });
        Ok(Some(self.task(matched, payload, &references)))
    }

    /// Field patches are independent: never batched across fields or
    /// across tags/terms of the same field.
    fn schema_fields(&self, matched: &EntityMatch<'_>) -> Vec<Built> {
        let mut built = Vec::new();

        for field in AspectExtractor::schema_fields(&matched.source.raw) {
            let FieldAnnotations {
                field_path,
                tags,
                terms,
            } = match field {
                Ok(field) => field,
                Err(reason) => {
                    built.push(Err(reason));
                    continue;
                }
            };

            if !tags.is_empty() {
                let payload = AspectPayload::EditableSchemaFieldInfo(EditableSchemaFieldInfo {
                    field_path: field_path.clone(),
                    global_tags: Some(self.tag_payload(&tags)),
                    glossary_terms: None,
                });
                built.push(Ok(self.task(matched, payload, &tags)));
            }
            if !terms.is_empty() {
                let payload = AspectPayload::EditableSchemaFieldInfo(EditableSchemaFieldInfo {
                    field_path,
                    global_tags: None,
                    glossary_terms: Some(self.term_payload(&terms)),
                });
                built.push(Ok(self.task(matched, payload, &terms)));
            }
        }

        built
    }

    fn tag_payload(&self, urns: &[String]) -> GlobalTags {
        GlobalTags {
            tags: urns
                .iter()
                .map(|urn| TagAssociation {
                    tag: self.engine.mutate_search_token(urn),
                })
                .collect(),
        }
    }

    fn term_payload(&self, urns: &[String]) -> GlossaryTerms {
        GlossaryTerms {
            terms: urns
                .iter()
                .map(|urn| GlossaryTermAssociation {
                    urn: self.engine.mutate_search_token(urn),
                })
                .collect(),
            audit_stamp: self.audit.clone(),
        }
    }

    fn task(
        &self,
        matched: &EntityMatch<'_>,
        payload: AspectPayload,
        references: &[String],
    ) -> McpTask {
        let source_urns = std::iter::once(matched.source.urn.clone())
            .chain(references.iter().cloned())
            .collect();
        McpTask::new(matched.target_urn.clone(), payload, source_urns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::SourceEntityRecord;
    use crate::domain::matching::MatchProvenance;
    use crate::domain::mutation::MutationRules;
    use anyhow::Result;
    use serde_json::{Value, json};

    const TARGET_URN: &str = "urn:li:dataset:(urn:li:dataPlatform:mysql,xyz.sales.orders,PROD)";

    fn stamp() -> AuditStamp {
        AuditStamp {
            time: 0,
            actor: "urn:li:corpuser:migration".to_string(),
        }
    }

    fn engine(already_applied: bool) -> Result<MutationEngine> {
        let mut rules = MutationRules::default();
        rules
            .platform_instances
            .insert("abc".to_string(), "xyz".to_string());
        Ok(MutationEngine::new(rules, already_applied)?)
    }

    fn record(extra: Value) -> Result<SourceEntityRecord> {
        let mut raw = json!({
            "urn": "urn:li:dataset:(urn:li:dataPlatform:mysql,abc.sales.orders,PROD)",
            "name": "orders",
            "platformInstance": "abc"
        });
        if let (Some(base), Value::Object(more)) = (raw.as_object_mut(), extra) {
            base.extend(more);
        }
        Ok(SourceEntityRecord::from_snapshot(0, raw)?)
    }

    fn matched(source: &SourceEntityRecord) -> EntityMatch<'_> {
        EntityMatch {
            source,
            target_urn: TARGET_URN.to_string(),
            mutated_urn: TARGET_URN.to_string(),
            confidence: 1.0,
            provenance: MatchProvenance::BrowsePathMatch,
        }
    }

    fn count(outcome: &BuildOutcome, kind: AspectKind) -> usize {
        outcome.tasks.iter().filter(|t| t.aspect() == kind).count()
    }

    #[test]
    fn test_one_task_per_aspect_and_per_field() -> Result<()> {
        let source = record(json!({
            "tags": ["urn:li:tag:pii"],
            "glossaryTerms": ["urn:li:glossaryTerm:orders"],
            "domain": "urn:li:domain:sales",
            "structuredProperties": [{"propertyUrn": "urn:li:structuredProperty:tier", "values": ["gold"]}],
            "schemaFields": [
                {"fieldPath": "email", "tags": ["urn:li:tag:pii"]},
                {"fieldPath": "phone", "tags": ["urn:li:tag:pii"]}
            ]
        }))?;
        let engine = engine(false)?;
        let outcome = ChangeProposalBuilder::new(&engine, stamp()).build(&matched(&source));

        assert!(outcome.failures.is_empty());
        assert_eq!(count(&outcome, AspectKind::GlobalTags), 1);
        assert_eq!(count(&outcome, AspectKind::GlossaryTerms), 1);
        assert_eq!(count(&outcome, AspectKind::Domains), 1);
        assert_eq!(count(&outcome, AspectKind::StructuredProperties), 1);
        assert_eq!(count(&outcome, AspectKind::EditableSchemaFieldInfo), 2);
        assert_eq!(outcome.tasks.len(), 6);
        assert!(outcome.tasks.iter().all(|t| t.entity_urn == TARGET_URN));
        Ok(())
    }

    #[test]
    fn test_no_annotations_no_tasks() -> Result<()> {
        let source = record(json!({}))?;
        let engine = engine(false)?;
        let outcome = ChangeProposalBuilder::new(&engine, stamp()).build(&matched(&source));
        assert!(outcome.tasks.is_empty());
        assert!(outcome.failures.is_empty());
        Ok(())
    }

    #[test]
    fn test_references_mutated_even_when_already_applied() -> Result<()> {
        let source = record(json!({
            "tags": ["urn:li:tag:abc"],
            "domain": "urn:li:domain:abc"
        }))?;
        let engine = engine(true)?;
        let outcome = ChangeProposalBuilder::new(&engine, stamp()).build(&matched(&source));

        let tags = outcome
            .tasks
            .iter()
            .find(|t| t.aspect() == AspectKind::GlobalTags)
            .ok_or_else(|| anyhow::anyhow!("missing globalTags task"))?;
        assert_eq!(tags.payload.referenced_urns(), vec!["urn:li:tag:xyz"]);
        // Audit trail keeps the pre-mutation references
        assert_eq!(
            tags.source_urns,
            vec![source.urn.clone(), "urn:li:tag:abc".to_string()]
        );

        let domains = outcome
            .tasks
            .iter()
            .find(|t| t.aspect() == AspectKind::Domains)
            .ok_or_else(|| anyhow::anyhow!("missing domains task"))?;
        assert_eq!(domains.payload.referenced_urns(), vec!["urn:li:domain:xyz"]);
        Ok(())
    }

    #[test]
    fn test_field_with_tags_and_terms_gives_two_tasks() -> Result<()> {
        let source = record(json!({
            "schemaFields": [{
                "fieldPath": "email",
                "tags": ["urn:li:tag:pii"],
                "glossaryTerms": ["urn:li:glossaryTerm:contact"]
            }]
        }))?;
        let engine = engine(false)?;
        let outcome = ChangeProposalBuilder::new(&engine, stamp()).build(&matched(&source));
        assert_eq!(count(&outcome, AspectKind::EditableSchemaFieldInfo), 2);
        Ok(())
    }

    #[test]
    fn test_malformed_aspect_only_skips_its_task() -> Result<()> {
        let source = record(json!({
            "tags": [{"name": "no urn here"}],
            "domain": "urn:li:domain:sales",
            "schemaFields": [
                {"tags": ["urn:li:tag:pii"]},
                {"fieldPath": "email", "tags": ["urn:li:tag:pii"]}
            ]
        }))?;
        let engine = engine(false)?;
        let outcome = ChangeProposalBuilder::new(&engine, stamp()).build(&matched(&source));

        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(count(&outcome, AspectKind::GlobalTags), 0);
        assert_eq!(count(&outcome, AspectKind::Domains), 1);
        assert_eq!(count(&outcome, AspectKind::EditableSchemaFieldInfo), 1);
        Ok(())
    }
}
