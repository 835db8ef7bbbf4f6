pub mod mutation;
pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use mutation::{effective_rules, load_mutation_rules, resolve_mutation_rules};
pub use project::{find_main_config, load_project_config};
