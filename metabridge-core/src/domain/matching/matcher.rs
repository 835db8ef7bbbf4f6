// metabridge-core/src/domain/matching/matcher.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::domain::entity::{SourceEntityRecord, TargetEntityRecord, urn};
use crate::domain::mutation::MutationEngine;

pub const EXACT_CONFIDENCE: f64 = 1.0;
pub const NAME_ONLY_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchProvenance {
    /// Tier 1: platform instance + browse path + name.
    BrowsePathMatch,
    /// Tier 2: bare name only.
    NameOnlyMatch,
}

impl MatchProvenance {
    pub fn confidence(&self) -> f64 {
        match self {
            Self::BrowsePathMatch => EXACT_CONFIDENCE,
            Self::NameOnlyMatch => NAME_ONLY_CONFIDENCE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BrowsePathMatch => "browse-path-match",
            Self::NameOnlyMatch => "name-only-match",
        }
    }
}

impl fmt::Display for MatchProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A source entity paired with the target entity it will be migrated onto.
#[derive(Debug, Clone)]
pub struct EntityMatch<'s> {
    pub source: &'s SourceEntityRecord,
    pub target_urn: String,
    /// Source urn after entity-urn mode mutation (unchanged when the export
    /// was already mutated).
    pub mutated_urn: String,
    pub confidence: f64,
    pub provenance: MatchProvenance,
}

/// Serializable view of an [`EntityMatch`] for the match report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub source_urn: String,
    pub mutated_urn: String,
    pub target_urn: String,
    pub confidence: f64,
    pub provenance: MatchProvenance,
}

impl EntityMatch<'_> {
    pub fn to_record(&self) -> MatchRecord {
        MatchRecord {
            source_urn: self.source.urn.clone(),
            mutated_urn: self.mutated_urn.clone(),
            target_urn: self.target_urn.clone(),
            confidence: self.confidence,
            provenance: self.provenance,
        }
    }
}

#[derive(Debug, Default)]
pub struct MatchOutcome<'s> {
    pub matches: Vec<EntityMatch<'s>>,
    pub unmatched: Vec<&'s SourceEntityRecord>,
}

impl MatchOutcome<'_> {
    pub fn count_by(&self, provenance: MatchProvenance) -> usize {
        self.matches
            .iter()
            .filter(|m| m.provenance == provenance)
            .count()
    }
}

/// Tiered matcher over an insertion-ordered lookup table
/// `type:browsePath:name` (lowercased) -> target entity.
///
/// The table is built once and only read afterwards. Duplicate keys keep
/// the first target inserted, and the Tier-2 scan walks the table in
/// insertion order, so identical inputs always give identical matches.
pub struct EntityMatcher<'t> {
    lookup: IndexMap<String, &'t TargetEntityRecord>,
}

impl<'t> EntityMatcher<'t> {
    pub fn new(targets: &'t [TargetEntityRecord]) -> Self {
        let mut lookup = IndexMap::with_capacity(targets.len());
        for target in targets {
            let key = Self::lookup_key(&target.entity_type, &target.browse_path, &target.name);
            lookup.entry(key).or_insert(target);
        }
        Self { lookup }
    }

    pub fn lookup_key(entity_type: &str, browse_path: &str, name: &str) -> String {
        format!(
            "{}:{}:{}",
            urn::entity_type_key(entity_type),
            browse_path.to_lowercase(),
            name.to_lowercase()
        )
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lookup.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// `instance.<segments>.<name>` for entities with a platform instance,
    /// the bare name otherwise. Path components go through search-token
    /// mutation since target names carry target-side identifiers.
    pub fn expected_name(source: &SourceEntityRecord, engine: &MutationEngine) -> String {
        if source.platform_instance.is_none() {
            return source.name.clone();
        }
        let mut parts: Vec<String> = source
            .path_components
            .iter()
            .map(|component| engine.mutate_search_token(component))
            .collect();
        parts.push(source.name.clone());
        parts.join(".")
    }

    pub fn match_one<'s>(
        &self,
        source: &'s SourceEntityRecord,
        engine: &MutationEngine,
    ) -> Option<EntityMatch<'s>> {
        let expected = Self::expected_name(source, engine);

        // Tier 1: exact key
        let exact_key = Self::lookup_key(&source.entity_type, "", &expected);
        let (target, provenance) = match self.lookup.get(&exact_key) {
            Some(target) => (*target, MatchProvenance::BrowsePathMatch),
            None => {
                // Tier 2: first key ending with `:<bareName>`, table order
                let suffix = format!(":{}", source.name.to_lowercase());
                let (_, target) = self.lookup.iter().find(|(key, _)| key.ends_with(&suffix))?;
                (*target, MatchProvenance::NameOnlyMatch)
            }
        };

        Some(EntityMatch {
            source,
            target_urn: target.urn.clone(),
            mutated_urn: engine.mutate_entity_urn(&source.urn),
            confidence: provenance.confidence(),
            provenance,
        })
    }

    /// Matches every source entity in input order; a miss is not an error.
    pub fn match_all<'s>(
        &self,
        sources: &'s [SourceEntityRecord],
        engine: &MutationEngine,
    ) -> MatchOutcome<'s> {
        let mut outcome = MatchOutcome::default();

        for source in sources {
            match self.match_one(source, engine) {
                Some(found) => {
                    debug!(
                        source = %source.urn,
                        target = %found.target_urn,
                        confidence = found.confidence,
                        provenance = %found.provenance,
                        "Matched entity"
                    );
                    if found.mutated_urn != found.target_urn {
                        debug!(
                            mutated = %found.mutated_urn,
                            target = %found.target_urn,
                            "Mutated source urn differs from matched target urn"
                        );
                    }
                    outcome.matches.push(found);
                }
                None => {
                    info!(source = %source.urn, name = %source.name, "No target match");
                    outcome.unmatched.push(source);
                }
            }
        }

        outcome
    }
}
