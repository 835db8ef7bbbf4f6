// metabridge-core/src/domain/matching/mod.rs

pub mod comparator;
pub mod matcher;

pub use comparator::NameComparator;
pub use matcher::{
    EXACT_CONFIDENCE, EntityMatch, EntityMatcher, MatchOutcome, MatchProvenance, MatchRecord,
    NAME_ONLY_CONFIDENCE,
};
