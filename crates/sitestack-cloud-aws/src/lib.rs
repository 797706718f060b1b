//! AWS provider for sitestack
//!
//! This crate implements the CloudProvider trait for Amazon Web Services,
//! covering every resource a static website stack needs.
//!
//! # Resources
//!
//! - S3 buckets with website hosting and a public-read policy
//! - IAM deploy policy and deploy user
//! - ACM certificates (always requested in `us-east-1`)
//! - CloudFront distributions in front of bucket website endpoints
//! - Route 53 alias records pointing at distributions
//!
//! # Requirements
//!
//! - `aws` CLI v2 must be installed
//! - Credentials come from the CLI's own configuration, optionally a named profile
//!
//! # Example
//!
//! ```ignore
//! use sitestack_cloud::{CloudProvider, Sequencer, site_blueprint};
//! use sitestack_cloud_aws::AwsProvider;
//!
//! let provider = AwsProvider::new(&config.region, config.profile.clone());
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//!
//! let manifest = Sequencer::new(&provider).run(&site_blueprint(&config)).await?;
//! ```

pub mod aws_cli;
pub mod documents;
pub mod error;
pub mod provider;

pub use aws_cli::{AwsCli, CallerIdentity};
pub use error::{AwsError, Result};
pub use provider::AwsProvider;
