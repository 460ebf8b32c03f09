//! Error types for the user registry.

use crate::model::UserId;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while serving or starting the registry.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid user ID")]
    InvalidId,

    #[error("Invalid input")]
    InvalidInput,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("User not found")]
    NotFound(UserId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// Returns true for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidId
                | ServiceError::InvalidInput
                | ServiceError::Validation(_)
                | ServiceError::NotFound(_)
        )
    }
}
