// metabridge-core/src/application/mod.rs

pub mod emitter;
pub mod inspect;
pub mod pipeline;
pub mod replay;
pub mod search;

// --- RE-EXPORTS (FACADE) ---
// Lets the CLI do `use metabridge_core::application::{run_migration, ...};`
// without knowing the file layout.

pub use emitter::{ChangeProposalEmitter, EmitFailure, EmitReport};
pub use inspect::{ExportInspection, inspect_export};
pub use pipeline::{MigrationOptions, MigrationSummary, run_migration};
pub use replay::apply_task_dir;
pub use search::{SearchParameters, SearchResults, StrategyReport, TargetSearchClient};
