// metabridge-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(metabridge::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- SERIALIZATION ---
    #[error("JSON Parsing Error: {0}")]
    #[diagnostic(code(metabridge::infra::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(metabridge::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    // --- EXPORT FILE ---
    #[error("Cannot load export '{path}': {reason}")]
    #[diagnostic(
        code(metabridge::infra::export),
        help("Expected {{\"metadata\": ..., \"entities\": [...]}}, {{\"export_data\": [...]}}, a list, or a single entity object.")
    )]
    ExportLoad { path: String, reason: String },

    // --- CONFIG ---
    #[error("Configuration Error: {0}")]
    #[diagnostic(code(metabridge::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(metabridge::infra::config_missing))]
    ConfigNotFound(String),

    // --- TARGET CATALOG ---
    #[error("HTTP Error: {0}")]
    #[diagnostic(
        code(metabridge::infra::http),
        help("Check the environment 'server' URL and network reachability.")
    )]
    Http(#[from] reqwest::Error),

    #[error("{operation} timed out after {secs}s")]
    #[diagnostic(code(metabridge::infra::timeout))]
    Timeout { operation: String, secs: u64 },

    #[error("Unexpected catalog response: {0}")]
    #[diagnostic(code(metabridge::infra::catalog_response))]
    CatalogResponse(String),
}
