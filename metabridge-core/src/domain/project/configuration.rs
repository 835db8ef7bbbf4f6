// metabridge-core/src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

use crate::domain::mutation::MutationRules;

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[serde(rename = "output-path", default = "default_output_path")]
    #[validate(length(min = 1, message = "Output path cannot be empty"))]
    pub output_path: String,

    #[serde(default)]
    #[validate(nested)]
    pub search: SearchSettings,

    #[serde(default)]
    #[validate(nested)]
    pub emit: EmitSettings,

    #[serde(default)]
    #[validate(nested)]
    pub environments: HashMap<String, EnvironmentConfig>,
}

impl ProjectConfig {
    pub fn environment(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.get(name)
    }

    /// Sorted, for stable error messages.
    pub fn environment_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.environments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct SearchSettings {
    #[serde(rename = "page-size", default = "default_page_size")]
    #[validate(range(min = 1, max = 10000, message = "Page size must be between 1 and 10000"))]
    pub page_size: usize,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct EmitSettings {
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,

    /// Actor recorded in glossary-term audit stamps.
    #[serde(default = "default_actor")]
    #[validate(length(min = 1))]
    pub actor: String,
}

impl Default for EmitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            actor: default_actor(),
        }
    }
}

/// A target environment: either a live catalog (`server`) or an offline
/// snapshot file, never both.
#[derive(Debug, Deserialize, Serialize, Clone, Default, Validate)]
#[validate(schema(function = "validate_backend"))]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub server: Option<String>,

    /// Name of the environment variable holding the bearer token.
    #[serde(rename = "token-env", default)]
    pub token_env: Option<String>,

    #[serde(default)]
    pub snapshot: Option<String>,

    #[serde(rename = "mutations-file", default)]
    pub mutations_file: Option<String>,

    #[serde(default)]
    pub mutations: Option<MutationRules>,
}

fn validate_backend(env: &EnvironmentConfig) -> Result<(), ValidationError> {
    match (&env.server, &env.snapshot) {
        (Some(_), Some(_)) => Err(ValidationError::new("backend")
            .with_message("set either 'server' or 'snapshot', not both".into())),
        (None, None) => Err(ValidationError::new("backend")
            .with_message("one of 'server' or 'snapshot' is required".into())),
        (Some(server), None)
            if !server.starts_with("http://") && !server.starts_with("https://") =>
        {
            Err(ValidationError::new("server")
                .with_message("server must be an http(s) URL".into()))
        }
        _ => Ok(()),
    }
}

fn default_output_path() -> String {
    "mcp_output".to_string()
}
fn default_page_size() -> usize {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_actor() -> String {
    "urn:li:corpuser:datahub".to_string()
}
