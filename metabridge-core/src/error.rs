// metabridge-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum MetabridgeError {
    // --- DOMAIN ERRORS (records, aspects, mutation rules) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, network) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    #[diagnostic(code(metabridge::internal))]
    InternalError(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for MetabridgeError {
    fn from(err: std::io::Error) -> Self {
        MetabridgeError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl MetabridgeError {
    /// True for failures of the remote catalog (transport, timeout, bad response).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MetabridgeError::Infrastructure(
                InfrastructureError::Http(_)
                    | InfrastructureError::Timeout { .. }
                    | InfrastructureError::CatalogResponse(_)
            )
        )
    }
}
