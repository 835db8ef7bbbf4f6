// metabridge-core/src/domain/entity/mod.rs

pub mod accessor;
pub mod source;
pub mod target;
pub mod urn;

pub use source::{SourceEntityRecord, partition_records};
pub use target::TargetEntityRecord;
