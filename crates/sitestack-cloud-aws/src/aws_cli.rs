//! aws CLI wrapper
//!
//! Wraps the aws CLI commands needed to provision a static website:
//! S3, IAM, ACM, CloudFront and Route 53.

use crate::documents::{self, CERTIFICATE_REGION};
use crate::error::{AwsError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// stderr fragments the aws CLI prints when a lookup finds nothing
const NOT_FOUND_MARKERS: &[&str] = &[
    "(404)",
    "Not Found",
    "NoSuchBucket",
    "NoSuchEntity",
    "NoSuchHostedZone",
    "NoSuchDistribution",
    "ResourceNotFoundException",
];

/// Turn a failed invocation's stderr into an error
pub fn classify_failure(stderr: &str) -> AwsError {
    let message = stderr.trim().to_string();
    if NOT_FOUND_MARKERS.iter().any(|m| message.contains(m)) {
        AwsError::NotFound(message)
    } else if message.contains("Unable to locate credentials")
        || message.contains("InvalidClientTokenId")
        || message.contains("ExpiredToken")
    {
        AwsError::AuthenticationFailed(message)
    } else {
        AwsError::CommandFailed(message)
    }
}

/// aws CLI wrapper
pub struct AwsCli {
    region: String,
    profile: Option<String>,
}

impl AwsCli {
    pub fn new(region: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            region: region.into(),
            profile,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Check if the aws CLI is installed and has credentials
    pub async fn check_auth(&self) -> Result<CallerIdentity> {
        let which = Command::new("which").arg("aws").output().await?;

        if !which.status.success() {
            return Err(AwsError::AwsCliNotFound);
        }

        self.run_json(&["sts", "get-caller-identity"]).await
    }

    /// Run an aws command in the configured region and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        self.run_command_in(&self.region, args).await
    }

    async fn run_command_in(&self, region: &str, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("aws");
        if let Some(profile) = &self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd.arg("--region").arg(region);
        cmd.arg("--output").arg("json");
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: aws --region {} {}", region, args.join(" "));

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AwsError::AwsCliNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(&stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let output = self.run_command(args).await?;
        parse_json(&output)
    }

    /// Like [`AwsCli::run_command`], mapping "not found" to `None`
    async fn run_optional(&self, args: &[&str]) -> Result<Option<String>> {
        match self.run_command(args).await {
            Ok(output) => Ok(Some(output)),
            Err(AwsError::NotFound(msg)) => {
                tracing::debug!("Not found: {}", msg);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ========== S3 ==========

    /// Check a bucket exists and is ours; returns its region when reported
    pub async fn head_bucket(&self, bucket: &str) -> Result<Option<BucketInfo>> {
        let Some(output) = self
            .run_optional(&["s3api", "head-bucket", "--bucket", bucket])
            .await?
        else {
            return Ok(None);
        };

        let region = if output.trim().is_empty() {
            None
        } else {
            parse_json::<HeadBucketOutput>(&output)?.bucket_region
        };

        Ok(Some(BucketInfo {
            name: bucket.to_string(),
            region,
        }))
    }

    pub async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let location = format!("LocationConstraint={}", region);
        let mut args = vec!["s3api", "create-bucket", "--bucket", bucket];
        // us-east-1 rejects an explicit location constraint
        if region != "us-east-1" {
            args.push("--create-bucket-configuration");
            args.push(location.as_str());
        }

        self.run_command_in(region, &args).await?;
        Ok(())
    }

    /// Lift the public access block so the website policy can apply
    pub async fn allow_public_access(&self, bucket: &str) -> Result<()> {
        self.run_command(&[
            "s3api",
            "put-public-access-block",
            "--bucket",
            bucket,
            "--public-access-block-configuration",
            "BlockPublicAcls=false,IgnorePublicAcls=false,BlockPublicPolicy=false,RestrictPublicBuckets=false",
        ])
        .await?;
        Ok(())
    }

    pub async fn put_bucket_policy(&self, bucket: &str, policy: &serde_json::Value) -> Result<()> {
        let policy = policy.to_string();
        self.run_command(&["s3api", "put-bucket-policy", "--bucket", bucket, "--policy", &policy])
            .await?;
        Ok(())
    }

    pub async fn put_bucket_website(
        &self,
        bucket: &str,
        configuration: &serde_json::Value,
    ) -> Result<()> {
        let configuration = configuration.to_string();
        self.run_command(&[
            "s3api",
            "put-bucket-website",
            "--bucket",
            bucket,
            "--website-configuration",
            &configuration,
        ])
        .await?;
        Ok(())
    }

    // ========== IAM ==========

    /// Find a customer-managed policy by name
    pub async fn find_policy(&self, name: &str) -> Result<Option<PolicyInfo>> {
        let output: ListPoliciesOutput = self
            .run_json(&["iam", "list-policies", "--scope", "Local"])
            .await?;
        Ok(output.policies.into_iter().find(|p| p.policy_name == name))
    }

    pub async fn create_policy(
        &self,
        name: &str,
        document: &serde_json::Value,
    ) -> Result<PolicyInfo> {
        let document = document.to_string();
        let output: CreatePolicyOutput = self
            .run_json(&[
                "iam",
                "create-policy",
                "--policy-name",
                name,
                "--policy-document",
                &document,
            ])
            .await?;
        Ok(output.policy)
    }

    pub async fn get_user(&self, name: &str) -> Result<Option<UserInfo>> {
        let Some(output) = self
            .run_optional(&["iam", "get-user", "--user-name", name])
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(parse_json::<UserOutput>(&output)?.user))
    }

    pub async fn create_user(&self, name: &str) -> Result<UserInfo> {
        let output: UserOutput = self
            .run_json(&["iam", "create-user", "--user-name", name])
            .await?;
        Ok(output.user)
    }

    pub async fn attach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        self.run_command(&[
            "iam",
            "attach-user-policy",
            "--user-name",
            user,
            "--policy-arn",
            policy_arn,
        ])
        .await?;
        Ok(())
    }

    // ========== ACM ==========

    /// Find a pending or issued certificate for a domain (us-east-1)
    pub async fn find_certificate(&self, domain: &str) -> Result<Option<CertificateSummary>> {
        let output = self
            .run_command_in(
                CERTIFICATE_REGION,
                &[
                    "acm",
                    "list-certificates",
                    "--certificate-statuses",
                    "PENDING_VALIDATION",
                    "ISSUED",
                ],
            )
            .await?;
        let list: ListCertificatesOutput = parse_json(&output)?;
        Ok(list
            .certificate_summary_list
            .into_iter()
            .find(|c| c.domain_name == domain))
    }

    /// Request a DNS-validated certificate (us-east-1)
    pub async fn request_certificate(
        &self,
        domain: &str,
        subject_alternative_names: &[String],
    ) -> Result<String> {
        let token = documents::idempotency_token(domain);
        let mut args = vec![
            "acm",
            "request-certificate",
            "--domain-name",
            domain,
            "--validation-method",
            "DNS",
            "--idempotency-token",
            token.as_str(),
        ];
        if !subject_alternative_names.is_empty() {
            args.push("--subject-alternative-names");
            args.extend(subject_alternative_names.iter().map(String::as_str));
        }

        let output = self.run_command_in(CERTIFICATE_REGION, &args).await?;
        let requested: RequestCertificateOutput = parse_json(&output)?;
        Ok(requested.certificate_arn)
    }

    // ========== CloudFront ==========

    /// Find the distribution serving an alternate domain name
    pub async fn find_distribution(&self, alias: &str) -> Result<Option<DistributionInfo>> {
        let output: ListDistributionsOutput =
            self.run_json(&["cloudfront", "list-distributions"]).await?;
        Ok(find_distribution_by_alias(output, alias))
    }

    pub async fn create_distribution(
        &self,
        config: &serde_json::Value,
    ) -> Result<DistributionInfo> {
        let config = config.to_string();
        let output: CreateDistributionOutput = self
            .run_json(&[
                "cloudfront",
                "create-distribution",
                "--distribution-config",
                &config,
            ])
            .await?;
        Ok(output.distribution.into())
    }

    // ========== Route 53 ==========

    /// Find the public hosted zone for a domain
    pub async fn find_hosted_zone(&self, domain: &str) -> Result<Option<HostedZone>> {
        let output: ListHostedZonesOutput = self
            .run_json(&["route53", "list-hosted-zones-by-name", "--dns-name", domain])
            .await?;
        let wanted = documents::fqdn(domain);
        Ok(output
            .hosted_zones
            .into_iter()
            .find(|z| z.name == wanted && !z.is_private()))
    }

    /// Find an A record by exact name
    pub async fn find_a_record(&self, zone_id: &str, name: &str) -> Result<Option<RecordSet>> {
        let output: ListRecordSetsOutput = self
            .run_json(&[
                "route53",
                "list-resource-record-sets",
                "--hosted-zone-id",
                zone_id,
                "--start-record-name",
                name,
                "--start-record-type",
                "A",
                "--max-items",
                "1",
            ])
            .await?;
        let wanted = documents::fqdn(name);
        Ok(output
            .resource_record_sets
            .into_iter()
            .find(|r| r.name == wanted && r.record_type == "A"))
    }

    pub async fn change_record_sets(
        &self,
        zone_id: &str,
        change_batch: &serde_json::Value,
    ) -> Result<ChangeInfo> {
        let change_batch = change_batch.to_string();
        let output: ChangeRecordSetsOutput = self
            .run_json(&[
                "route53",
                "change-resource-record-sets",
                "--hosted-zone-id",
                zone_id,
                "--change-batch",
                &change_batch,
            ])
            .await?;
        Ok(output.change_info)
    }
}

fn parse_json<T: DeserializeOwned>(output: &str) -> Result<T> {
    if output.trim().is_empty() {
        return Err(AwsError::UnexpectedOutput("empty output".to_string()));
    }
    Ok(serde_json::from_str(output)?)
}

fn find_distribution_by_alias(
    output: ListDistributionsOutput,
    alias: &str,
) -> Option<DistributionInfo> {
    output
        .distribution_list
        .items
        .into_iter()
        .find(|d| d.aliases.items.iter().any(|a| a == alias))
        .map(DistributionInfo::from)
}

// ============ Output Types ============

/// `sts get-caller-identity`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct BucketInfo {
    pub name: String,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HeadBucketOutput {
    #[serde(default)]
    bucket_region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyInfo {
    pub policy_name: String,
    pub arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListPoliciesOutput {
    #[serde(default)]
    policies: Vec<PolicyInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreatePolicyOutput {
    policy: PolicyInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserInfo {
    pub user_name: String,
    pub user_id: String,
    pub arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserOutput {
    user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateSummary {
    pub certificate_arn: String,
    pub domain_name: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListCertificatesOutput {
    #[serde(default)]
    certificate_summary_list: Vec<CertificateSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RequestCertificateOutput {
    certificate_arn: String,
}

/// Distribution id, ARN and `*.cloudfront.net` domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionInfo {
    pub id: String,
    pub arn: String,
    pub domain_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiDistribution {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "ARN")]
    arn: String,
    #[serde(rename = "DomainName")]
    domain_name: String,
    #[serde(rename = "Aliases", default)]
    aliases: ApiAliases,
}

impl From<ApiDistribution> for DistributionInfo {
    fn from(d: ApiDistribution) -> Self {
        Self {
            id: d.id,
            arn: d.arn,
            domain_name: d.domain_name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ApiAliases {
    #[serde(rename = "Items", default)]
    items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListDistributionsOutput {
    #[serde(rename = "DistributionList", default)]
    distribution_list: ApiDistributionList,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDistributionList {
    #[serde(rename = "Items", default)]
    items: Vec<ApiDistribution>,
}

#[derive(Debug, Deserialize)]
struct CreateDistributionOutput {
    #[serde(rename = "Distribution")]
    distribution: ApiDistributionCreated,
}

#[derive(Debug, Deserialize)]
struct ApiDistributionCreated {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "ARN")]
    arn: String,
    #[serde(rename = "DomainName")]
    domain_name: String,
}

impl From<ApiDistributionCreated> for DistributionInfo {
    fn from(d: ApiDistributionCreated) -> Self {
        Self {
            id: d.id,
            arn: d.arn,
            domain_name: d.domain_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZone {
    /// `/hostedzone/<id>`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub config: Option<HostedZoneConfig>,
}

impl HostedZone {
    pub fn is_private(&self) -> bool {
        self.config.as_ref().is_some_and(|c| c.private_zone)
    }

    /// Zone id without the `/hostedzone/` prefix
    pub fn short_id(&self) -> &str {
        self.id.trim_start_matches("/hostedzone/")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZoneConfig {
    #[serde(default)]
    pub private_zone: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListHostedZonesOutput {
    #[serde(default)]
    hosted_zones: Vec<HostedZone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordSet {
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(default)]
    pub alias_target: Option<AliasTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliasTarget {
    #[serde(rename = "DNSName")]
    pub dns_name: String,
    pub hosted_zone_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListRecordSetsOutput {
    #[serde(default)]
    resource_record_sets: Vec<RecordSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeInfo {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChangeRecordSetsOutput {
    change_info: ChangeInfo,
}
