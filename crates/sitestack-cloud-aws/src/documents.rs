//! JSON documents passed to the aws CLI

use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// Hosted zone id shared by every CloudFront distribution (alias targets)
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// CloudFront only accepts ACM certificates from this region
pub const CERTIFICATE_REGION: &str = "us-east-1";

/// Regions whose website endpoints use `s3-website-<region>` instead of
/// `s3-website.<region>`
const DASH_WEBSITE_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "eu-west-1",
    "sa-east-1",
    "us-gov-west-1",
];

/// Website hosting endpoint of a bucket
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    if DASH_WEBSITE_REGIONS.contains(&region) {
        format!("{}.s3-website-{}.amazonaws.com", bucket, region)
    } else {
        format!("{}.s3-website.{}.amazonaws.com", bucket, region)
    }
}

pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{}", bucket)
}

/// Bucket policy allowing anonymous reads of every object
pub fn public_read_policy(bucket: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": format!("{}/*", bucket_arn(bucket)),
        }]
    })
}

pub fn website_configuration(index_document: &str, error_document: &str) -> Value {
    json!({
        "IndexDocument": { "Suffix": index_document },
        "ErrorDocument": { "Key": error_document },
    })
}

/// Identity policy for the deploy user: sync the buckets, invalidate caches
pub fn deploy_policy_document(buckets: &[String]) -> Value {
    let bucket_arns: Vec<String> = buckets.iter().map(|b| bucket_arn(b)).collect();
    let object_arns: Vec<String> = bucket_arns.iter().map(|a| format!("{}/*", a)).collect();

    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "ListSiteBuckets",
                "Effect": "Allow",
                "Action": ["s3:ListBucket", "s3:GetBucketLocation"],
                "Resource": bucket_arns,
            },
            {
                "Sid": "ManageSiteObjects",
                "Effect": "Allow",
                "Action": ["s3:GetObject", "s3:PutObject", "s3:DeleteObject"],
                "Resource": object_arns,
            },
            {
                "Sid": "InvalidateDistributions",
                "Effect": "Allow",
                "Action": ["cloudfront:CreateInvalidation", "cloudfront:GetInvalidation"],
                "Resource": "*",
            }
        ]
    })
}

/// ACM idempotency token for a domain (at most 32 alphanumeric characters)
///
/// A readable prefix of the domain followed by 8 hex digits of its SHA-256,
/// so domains differing only in punctuation get different tokens.
pub fn idempotency_token(domain: &str) -> String {
    let digest = Sha256::digest(domain.as_bytes());
    let suffix: String = digest[..4].iter().map(|b| format!("{:02x}", b)).collect();

    let mut token: String = domain
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(24)
        .collect();
    token.push_str(&suffix);
    token
}

/// Settings for a website distribution
#[derive(Debug, Clone)]
pub struct DistributionSettings<'a> {
    /// Alternate domain name (CNAME) served by the distribution
    pub alias: &'a str,
    /// Bucket website endpoint
    pub origin_domain: &'a str,
    pub certificate_arn: &'a str,
    pub default_root_object: &'a str,
}

/// `--distribution-config` body for a bucket website origin
///
/// The caller reference is the alias, so repeating the request for the
/// same alias cannot create a second distribution.
pub fn distribution_config(settings: &DistributionSettings<'_>) -> Value {
    let origin_id = format!("S3-Website-{}", settings.origin_domain);

    json!({
        "CallerReference": settings.alias,
        "Comment": format!("sitestack: {}", settings.alias),
        "Enabled": true,
        "DefaultRootObject": settings.default_root_object,
        "Aliases": { "Quantity": 1, "Items": [settings.alias] },
        "Origins": {
            "Quantity": 1,
            "Items": [{
                "Id": origin_id,
                "DomainName": settings.origin_domain,
                "CustomOriginConfig": {
                    "HTTPPort": 80,
                    "HTTPSPort": 443,
                    "OriginProtocolPolicy": "http-only",
                },
            }],
        },
        "DefaultCacheBehavior": {
            "TargetOriginId": origin_id,
            "ViewerProtocolPolicy": "redirect-to-https",
            "Compress": true,
            "AllowedMethods": {
                "Quantity": 2,
                "Items": ["GET", "HEAD"],
                "CachedMethods": { "Quantity": 2, "Items": ["GET", "HEAD"] },
            },
            "ForwardedValues": {
                "QueryString": false,
                "Cookies": { "Forward": "none" },
            },
            "MinTTL": 0,
        },
        "ViewerCertificate": {
            "ACMCertificateArn": settings.certificate_arn,
            "SSLSupportMethod": "sni-only",
            "MinimumProtocolVersion": "TLSv1.2_2021",
        },
        "PriceClass": "PriceClass_100",
        "HttpVersion": "http2",
    })
}

/// Change batch creating an alias A record pointing at a distribution
pub fn alias_change_batch(record_name: &str, distribution_domain: &str) -> Value {
    json!({
        "Comment": format!("sitestack: {}", record_name),
        "Changes": [{
            "Action": "CREATE",
            "ResourceRecordSet": {
                "Name": record_name,
                "Type": "A",
                "AliasTarget": {
                    "HostedZoneId": CLOUDFRONT_HOSTED_ZONE_ID,
                    "DNSName": distribution_domain,
                    "EvaluateTargetHealth": false,
                },
            },
        }]
    })
}

/// Route 53 returns names fully qualified
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_website_endpoint() {
        assert_eq!(
            website_endpoint("example.com", "us-east-1"),
            "example.com.s3-website-us-east-1.amazonaws.com"
        );
        assert_eq!(
            website_endpoint("example.com", "eu-central-1"),
            "example.com.s3-website.eu-central-1.amazonaws.com"
        );
    }

    #[test]
    fn test_deploy_policy_scopes_buckets() {
        let doc = deploy_policy_document(&["site-a".to_string(), "app.site-a".to_string()]);

        assert_eq!(
            doc["Statement"][0]["Resource"],
            json!(["arn:aws:s3:::site-a", "arn:aws:s3:::app.site-a"])
        );
        assert_eq!(
            doc["Statement"][1]["Resource"],
            json!(["arn:aws:s3:::site-a/*", "arn:aws:s3:::app.site-a/*"])
        );
    }

    #[test]
    fn test_distribution_config() {
        let config = distribution_config(&DistributionSettings {
            alias: "example.com",
            origin_domain: "example.com.s3-website-us-east-1.amazonaws.com",
            certificate_arn: "arn:aws:acm:us-east-1:123:certificate/abc",
            default_root_object: "index.html",
        });

        assert_eq!(config["CallerReference"], "example.com");
        assert_eq!(config["Aliases"]["Items"][0], "example.com");
        assert_eq!(
            config["Origins"]["Items"][0]["Id"],
            config["DefaultCacheBehavior"]["TargetOriginId"]
        );
        assert_eq!(
            config["ViewerCertificate"]["ACMCertificateArn"],
            "arn:aws:acm:us-east-1:123:certificate/abc"
        );
    }

    #[test]
    fn test_alias_change_batch() {
        let batch = alias_change_batch("app.example.com", "d111.cloudfront.net");
        let change = &batch["Changes"][0];

        assert_eq!(change["Action"], "CREATE");
        assert_eq!(change["ResourceRecordSet"]["Type"], "A");
        assert_eq!(
            change["ResourceRecordSet"]["AliasTarget"]["HostedZoneId"],
            CLOUDFRONT_HOSTED_ZONE_ID
        );
    }

    #[test]
    fn test_idempotency_token() {
        let token = idempotency_token("app.example.com");
        assert!(token.starts_with("appexamplecom"));
        assert_eq!(token.len(), "appexamplecom".len() + 8);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(token, idempotency_token("app.example.com"));

        assert_eq!(idempotency_token(&"a".repeat(40)).len(), 32);
    }

    #[test]
    fn test_idempotency_token_keeps_punctuation_apart() {
        assert_ne!(
            idempotency_token("ex-ample.com"),
            idempotency_token("exam.ple.com")
        );
    }

    #[test]
    fn test_fqdn() {
        assert_eq!(fqdn("example.com"), "example.com.");
        assert_eq!(fqdn("example.com."), "example.com.");
    }
}
