//! sitestack Cloud Provisioning
//!
//! This crate provides the provider abstraction and the idempotent
//! provisioning sequencer for sitestack.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  sitestack CLI                   │
//! │               (sitestack up/plan)                │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                sitestack-cloud                   │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │  Blueprint   │─▶│  Sequencer               │ │
//! │  └──────────────┘  │  describe → create       │ │
//! │                    │  context → manifest      │ │
//! │                    └────────────┬─────────────┘ │
//! │  trait CloudProvider { describe, create }       │
//! └─────────────────────────────────┬───────────────┘
//!                                   │
//!                           ┌───────▼───────┐
//!                           │  aws provider │
//!                           │  (aws CLI)    │
//!                           └───────────────┘
//! ```

pub mod action;
pub mod blueprint;
pub mod context;
pub mod error;
pub mod manifest;
pub mod provider;
pub mod resource;
pub mod sequencer;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary};
pub use blueprint::site_blueprint;
pub use context::{ProvisioningContext, ResolvedInputs};
pub use error::{CloudError, Operation, Result};
pub use manifest::{Manifest, ManifestEntry};
pub use provider::{AuthStatus, CloudProvider};
pub use resource::{
    Dependency, Handle, ResourceAttributes, ResourceDescriptor, ResourceKind, ResourceRef,
    ResourceState,
};
pub use sequencer::Sequencer;
