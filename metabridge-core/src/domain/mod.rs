pub mod aspect;
pub mod browse_path;
pub mod entity;
pub mod error;
pub mod matching;
pub mod mutation;
pub mod project;

pub use browse_path::BrowsePathNormalizer;
pub use error::DomainError;
pub use mutation::{MutationCategory, MutationEngine, MutationRules};
