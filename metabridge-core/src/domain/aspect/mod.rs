// metabridge-core/src/domain/aspect/mod.rs

pub mod builder;
pub mod extractor;
pub mod kind;
pub mod payload;
pub mod task;

pub use builder::{BuildOutcome, ChangeProposalBuilder};
pub use extractor::AspectExtractor;
pub use kind::AspectKind;
pub use payload::{AspectPayload, AuditStamp};
pub use task::{ChangeType, McpTask};
