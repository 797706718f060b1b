//! AWS provider implementation

use crate::aws_cli::{AwsCli, HostedZone};
use crate::documents::{self, DistributionSettings};
use crate::error::AwsError;
use async_trait::async_trait;
use sitestack_cloud::blueprint::input;
use sitestack_cloud::{
    AuthStatus, CloudError, CloudProvider, ResolvedInputs, ResourceAttributes,
    ResourceDescriptor, ResourceKind, Result,
};
use sitestack_config::site::{DEFAULT_ERROR_DOCUMENT, DEFAULT_INDEX_DOCUMENT};

/// Amazon Web Services provider
pub struct AwsProvider {
    cli: AwsCli,
}

impl AwsProvider {
    /// Create a provider for a region, optionally using a named CLI profile
    pub fn new(region: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            cli: AwsCli::new(region, profile),
        }
    }

    pub fn region(&self) -> &str {
        self.cli.region()
    }

    fn bucket_region<'d>(&'d self, descriptor: &'d ResourceDescriptor) -> &'d str {
        descriptor.config_str("region").unwrap_or(self.cli.region())
    }

    fn bucket_attributes(&self, name: &str, region: &str) -> ResourceAttributes {
        ResourceAttributes::new(name)
            .with_attribute("arn", documents::bucket_arn(name))
            .with_attribute("website_endpoint", documents::website_endpoint(name, region))
            .with_attribute("region", region)
    }

    // ========== describe ==========

    async fn describe_bucket(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        let Some(bucket) = self.cli.head_bucket(&descriptor.key).await? else {
            return Ok(None);
        };
        let region = bucket
            .region
            .unwrap_or_else(|| self.bucket_region(descriptor).to_string());
        Ok(Some(self.bucket_attributes(&bucket.name, &region)))
    }

    async fn describe_policy(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        Ok(self
            .cli
            .find_policy(&descriptor.key)
            .await?
            .map(|p| ResourceAttributes::new(p.arn).with_attribute("name", p.policy_name)))
    }

    async fn describe_user(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        Ok(self
            .cli
            .get_user(&descriptor.key)
            .await?
            .map(|u| ResourceAttributes::new(u.arn).with_attribute("name", u.user_name)))
    }

    async fn describe_certificate(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        Ok(self
            .cli
            .find_certificate(&descriptor.key)
            .await?
            .map(|c| {
                let attrs = ResourceAttributes::new(c.certificate_arn);
                match c.status {
                    Some(status) => attrs.with_attribute("status", status),
                    None => attrs,
                }
            }))
    }

    async fn describe_distribution(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        Ok(self
            .cli
            .find_distribution(&descriptor.key)
            .await?
            .map(|d| {
                ResourceAttributes::new(d.id)
                    .with_attribute("domain_name", d.domain_name)
                    .with_attribute("arn", d.arn)
            }))
    }

    async fn describe_dns_record(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        // Without a hosted zone the record cannot exist; create reports the zone
        let Some(zone) = self.cli.find_hosted_zone(record_zone(descriptor)).await? else {
            return Ok(None);
        };

        let record = self
            .cli
            .find_a_record(zone.short_id(), &descriptor.key)
            .await?;
        Ok(record.map(|r| {
            let attrs = ResourceAttributes::new(r.name).with_attribute("zone_id", zone.short_id());
            match r.alias_target {
                Some(target) => attrs.with_attribute("target", target.dns_name),
                None => attrs,
            }
        }))
    }

    // ========== create ==========

    async fn create_bucket(&self, descriptor: &ResourceDescriptor) -> Result<ResourceAttributes> {
        let name = descriptor.key.as_str();
        let region = self.bucket_region(descriptor);
        let index = descriptor
            .config_str("index_document")
            .unwrap_or(DEFAULT_INDEX_DOCUMENT);
        let error = descriptor
            .config_str("error_document")
            .unwrap_or(DEFAULT_ERROR_DOCUMENT);

        self.cli.create_bucket(name, region).await?;
        self.cli
            .allow_public_access(name)
            .await
            .map_err(after_create("put-public-access-block"))?;
        self.cli
            .put_bucket_policy(name, &documents::public_read_policy(name))
            .await
            .map_err(after_create("put-bucket-policy"))?;
        self.cli
            .put_bucket_website(name, &documents::website_configuration(index, error))
            .await
            .map_err(after_create("put-bucket-website"))?;

        Ok(self.bucket_attributes(name, region))
    }

    async fn create_policy(&self, descriptor: &ResourceDescriptor) -> Result<ResourceAttributes> {
        let buckets: Vec<String> = descriptor.get_config("buckets").unwrap_or_default();
        if buckets.is_empty() {
            return Err(CloudError::InvalidConfig(format!(
                "policy '{}' does not name any bucket",
                descriptor.key
            )));
        }

        let policy = self
            .cli
            .create_policy(&descriptor.key, &documents::deploy_policy_document(&buckets))
            .await?;
        Ok(ResourceAttributes::new(policy.arn).with_attribute("name", policy.policy_name))
    }

    async fn create_user(
        &self,
        descriptor: &ResourceDescriptor,
        inputs: &ResolvedInputs,
    ) -> Result<ResourceAttributes> {
        let policy = inputs.require(input::POLICY)?;

        let user = self.cli.create_user(&descriptor.key).await?;
        self.cli
            .attach_user_policy(&user.user_name, &policy.id)
            .await
            .map_err(after_create("attach-user-policy"))?;

        Ok(ResourceAttributes::new(user.arn)
            .with_attribute("name", user.user_name)
            .with_attribute("policy_arn", policy.id.as_str()))
    }

    async fn create_certificate(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<ResourceAttributes> {
        let sans: Vec<String> = descriptor
            .get_config("subject_alternative_names")
            .unwrap_or_default();

        let arn = self.cli.request_certificate(&descriptor.key, &sans).await?;
        Ok(ResourceAttributes::new(arn).with_attribute("status", "PENDING_VALIDATION"))
    }

    async fn create_distribution(
        &self,
        descriptor: &ResourceDescriptor,
        inputs: &ResolvedInputs,
    ) -> Result<ResourceAttributes> {
        let origin_domain = inputs.require_attribute(input::ORIGIN, "website_endpoint")?;
        let certificate = inputs.require(input::CERTIFICATE)?;
        let default_root_object = descriptor
            .config_str("default_root_object")
            .unwrap_or(DEFAULT_INDEX_DOCUMENT);

        let config = documents::distribution_config(&DistributionSettings {
            alias: &descriptor.key,
            origin_domain,
            certificate_arn: &certificate.id,
            default_root_object,
        });

        let distribution = self.cli.create_distribution(&config).await?;
        Ok(ResourceAttributes::new(distribution.id)
            .with_attribute("domain_name", distribution.domain_name)
            .with_attribute("arn", distribution.arn))
    }

    async fn create_dns_record(
        &self,
        descriptor: &ResourceDescriptor,
        inputs: &ResolvedInputs,
    ) -> Result<ResourceAttributes> {
        let target = inputs.require_attribute(input::TARGET, "domain_name")?;
        let zone = self.require_hosted_zone(descriptor).await?;

        let change = self
            .cli
            .change_record_sets(
                zone.short_id(),
                &documents::alias_change_batch(&descriptor.key, target),
            )
            .await?;
        tracing::debug!("Route 53 change {} is {}", change.id, change.status);

        Ok(ResourceAttributes::new(documents::fqdn(&descriptor.key))
            .with_attribute("zone_id", zone.short_id())
            .with_attribute("target", target))
    }

    async fn require_hosted_zone(&self, descriptor: &ResourceDescriptor) -> Result<HostedZone> {
        let zone = record_zone(descriptor);
        self.cli
            .find_hosted_zone(zone)
            .await?
            .ok_or_else(|| CloudError::DependencyUnavailable {
                kind: descriptor.kind,
                key: descriptor.key.clone(),
                dependency: AwsError::HostedZoneNotFound(zone.to_string()).to_string(),
            })
    }
}

/// Failure of a setup step run after the resource itself was created
///
/// Later runs find the resource and skip it, so the step has to be
/// finished by hand.
fn after_create(step: &'static str) -> impl FnOnce(AwsError) -> CloudError {
    move |e| {
        CloudError::ApiError(format!(
            "resource was created but '{}' failed; run that step by hand: {}",
            step, e
        ))
    }
}

/// Zone holding a record: the configured apex, else the record name itself
fn record_zone(descriptor: &ResourceDescriptor) -> &str {
    descriptor.config_str("zone").unwrap_or(&descriptor.key)
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn display_name(&self) -> &str {
        "Amazon Web Services"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        match self.cli.check_auth().await {
            Ok(identity) => Ok(AuthStatus::ok(format!(
                "{} ({})",
                identity.arn, identity.account
            ))),
            Err(AwsError::AwsCliNotFound) => Ok(AuthStatus::failed("aws CLI is not installed")),
            Err(e) => Ok(AuthStatus::failed(e.to_string())),
        }
    }

    async fn describe(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        match descriptor.kind {
            ResourceKind::Bucket => self.describe_bucket(descriptor).await,
            ResourceKind::Policy => self.describe_policy(descriptor).await,
            ResourceKind::User => self.describe_user(descriptor).await,
            ResourceKind::Certificate => self.describe_certificate(descriptor).await,
            ResourceKind::Distribution => self.describe_distribution(descriptor).await,
            ResourceKind::DnsRecord => self.describe_dns_record(descriptor).await,
        }
    }

    async fn create(
        &self,
        descriptor: &ResourceDescriptor,
        inputs: &ResolvedInputs,
    ) -> Result<ResourceAttributes> {
        match descriptor.kind {
            ResourceKind::Bucket => self.create_bucket(descriptor).await,
            ResourceKind::Policy => self.create_policy(descriptor).await,
            ResourceKind::User => self.create_user(descriptor, inputs).await,
            ResourceKind::Certificate => self.create_certificate(descriptor).await,
            ResourceKind::Distribution => self.create_distribution(descriptor, inputs).await,
            ResourceKind::DnsRecord => self.create_dns_record(descriptor, inputs).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_names() {
        let provider = AwsProvider::new("eu-west-1", None);
        assert_eq!(provider.name(), "aws");
        assert_eq!(provider.display_name(), "Amazon Web Services");
        assert_eq!(provider.region(), "eu-west-1");
    }

    #[test]
    fn test_bucket_region_prefers_descriptor() {
        let provider = AwsProvider::new("eu-west-1", None);
        let plain = ResourceDescriptor::bucket("site-a");
        let pinned = ResourceDescriptor::bucket("site-a").with_config("region", json!("us-east-1"));

        assert_eq!(provider.bucket_region(&plain), "eu-west-1");
        assert_eq!(provider.bucket_region(&pinned), "us-east-1");
    }

    #[test]
    fn test_bucket_attributes() {
        let provider = AwsProvider::new("eu-central-1", None);
        let attrs = provider.bucket_attributes("example.com", "eu-central-1");

        assert_eq!(attrs.id, "example.com");
        assert_eq!(
            attrs.attributes.get("website_endpoint").map(String::as_str),
            Some("example.com.s3-website.eu-central-1.amazonaws.com")
        );
        assert_eq!(
            attrs.attributes.get("arn").map(String::as_str),
            Some("arn:aws:s3:::example.com")
        );
    }

    #[test]
    fn test_after_create_names_the_step() {
        let err = after_create("put-bucket-policy")(AwsError::CommandFailed(
            "AccessDenied".to_string(),
        ))
        .for_resource(
            ResourceKind::Bucket,
            "example.com",
            sitestack_cloud::Operation::Create,
        );

        match err {
            CloudError::Provider {
                kind,
                key,
                message,
                ..
            } => {
                assert_eq!(kind, ResourceKind::Bucket);
                assert_eq!(key, "example.com");
                assert!(message.contains("put-bucket-policy"));
                assert!(message.contains("AccessDenied"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_record_zone() {
        let apex = ResourceDescriptor::dns_record("app.example.com")
            .with_config("zone", json!("example.com"));
        assert_eq!(record_zone(&apex), "example.com");

        let bare = ResourceDescriptor::dns_record("example.com");
        assert_eq!(record_zone(&bare), "example.com");
    }
}
