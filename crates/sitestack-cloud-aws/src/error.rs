//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("aws CLI not found. Please install: https://aws.amazon.com/cli/")]
    AwsCliNotFound,

    #[error("aws authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("aws command failed: {0}")]
    CommandFailed(String),

    #[error("Unexpected aws output: {0}")]
    UnexpectedOutput(String),

    #[error("Hosted zone not found: {0}")]
    HostedZoneNotFound(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<AwsError> for sitestack_cloud::CloudError {
    fn from(e: AwsError) -> Self {
        use sitestack_cloud::CloudError;
        match e {
            AwsError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            AwsError::CommandFailed(msg) => CloudError::CommandFailed(msg),
            AwsError::JsonError(e) => CloudError::Json(e),
            AwsError::IoError(e) => CloudError::Io(e),
            other => CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
