//! Cloud provider trait definition

use crate::context::ResolvedInputs;
use crate::error::Result;
use crate::resource::{ResourceAttributes, ResourceDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cloud provider abstraction trait
///
/// A provider answers two questions per resource kind: does the resource
/// identified by this natural key exist, and how is it created. It never
/// updates or deletes anything.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Look up a resource by its natural key
    ///
    /// `Ok(None)` means the resource is absent. Any other failure is an error.
    async fn describe(&self, descriptor: &ResourceDescriptor)
    -> Result<Option<ResourceAttributes>>;

    /// Create an absent resource
    ///
    /// `inputs` holds the handles of every dependency the descriptor declares.
    async fn create(
        &self,
        descriptor: &ResourceDescriptor,
        inputs: &ResolvedInputs,
    ) -> Result<ResourceAttributes>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}
