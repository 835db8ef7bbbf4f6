// metabridge-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{EmitSettings, EnvironmentConfig, ProjectConfig, SearchSettings};
