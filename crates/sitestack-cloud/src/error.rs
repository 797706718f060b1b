//! Cloud provisioning error types

use crate::resource::ResourceKind;
use thiserror::Error;

/// Provider call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Describe,
    Create,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Describe => write!(f, "describe"),
            Operation::Create => write!(f, "create"),
        }
    }
}

/// Cloud provisioning errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Provider error ({operation} {kind} '{key}'): {message}")]
    Provider {
        kind: ResourceKind,
        key: String,
        operation: Operation,
        message: String,
    },

    #[error("Dependency unavailable for {kind} '{key}': {dependency}")]
    DependencyUnavailable {
        kind: ResourceKind,
        key: String,
        dependency: String,
    },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Attach resource context to a raw provider failure
    ///
    /// Errors that already carry their classification pass through unchanged.
    pub fn for_resource(self, kind: ResourceKind, key: &str, operation: Operation) -> Self {
        match self {
            e @ (CloudError::InvalidConfig(_)
            | CloudError::Provider { .. }
            | CloudError::DependencyUnavailable { .. }) => e,
            other => CloudError::Provider {
                kind,
                key: key.to_string(),
                operation,
                message: other.to_string(),
            },
        }
    }
}

impl From<sitestack_config::ConfigError> for CloudError {
    fn from(e: sitestack_config::ConfigError) -> Self {
        CloudError::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
