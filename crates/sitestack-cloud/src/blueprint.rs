//! Static-site blueprint
//!
//! The fixed, dependency-ordered list of resources making up a static
//! website stack: deploy policy and user, site and app buckets, a TLS
//! certificate, one distribution per bucket and one alias record per
//! distribution.

use crate::resource::ResourceDescriptor;
use serde_json::json;
use sitestack_config::SiteConfig;

/// Dependency names shared between the blueprint and providers
pub mod input {
    /// user -> policy to attach
    pub const POLICY: &str = "policy";
    /// distribution -> bucket serving the content
    pub const ORIGIN: &str = "origin";
    /// distribution -> TLS certificate
    pub const CERTIFICATE: &str = "certificate";
    /// dns-record -> distribution to alias
    pub const TARGET: &str = "target";
}

/// Build the descriptor list for a site, in provisioning order
pub fn site_blueprint(config: &SiteConfig) -> Vec<ResourceDescriptor> {
    let policy = ResourceDescriptor::policy(&config.policy_name).with_config(
        "buckets",
        json!([config.bucket_name, config.app_bucket_name]),
    );

    let user = ResourceDescriptor::user(&config.user_name)
        .depends_on(input::POLICY, policy.reference());

    let site_bucket = website_bucket(config, &config.bucket_name);
    let app_bucket = website_bucket(config, &config.app_bucket_name);

    let certificate = ResourceDescriptor::certificate(&config.domain_name).with_config(
        "subject_alternative_names",
        json!([config.app_subdomain]),
    );

    let site_distribution = distribution(config, &config.domain_name, &site_bucket, &certificate);
    let app_distribution = distribution(config, &config.app_subdomain, &app_bucket, &certificate);

    let site_record = alias_record(config, &config.domain_name, &site_distribution);
    let app_record = alias_record(config, &config.app_subdomain, &app_distribution);

    vec![
        policy,
        user,
        site_bucket,
        app_bucket,
        certificate,
        site_distribution,
        app_distribution,
        site_record,
        app_record,
    ]
}

fn website_bucket(config: &SiteConfig, name: &str) -> ResourceDescriptor {
    ResourceDescriptor::bucket(name)
        .with_config("region", json!(config.region))
        .with_config("index_document", json!(config.index_document))
        .with_config("error_document", json!(config.error_document))
}

fn distribution(
    config: &SiteConfig,
    alias: &str,
    bucket: &ResourceDescriptor,
    certificate: &ResourceDescriptor,
) -> ResourceDescriptor {
    ResourceDescriptor::distribution(alias)
        .depends_on(input::ORIGIN, bucket.reference())
        .depends_on(input::CERTIFICATE, certificate.reference())
        .with_config("default_root_object", json!(config.index_document))
}

fn alias_record(
    config: &SiteConfig,
    name: &str,
    distribution: &ResourceDescriptor,
) -> ResourceDescriptor {
    ResourceDescriptor::dns_record(name)
        .depends_on(input::TARGET, distribution.reference())
        .with_config("zone", json!(config.domain_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Sequencer;
    use sitestack_config::SiteSettings;

    fn config() -> SiteConfig {
        SiteSettings {
            bucket_name: Some("example.com".to_string()),
            domain_name: Some("example.com".to_string()),
            region: Some("eu-west-1".to_string()),
            ..SiteSettings::default()
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_blueprint_order() {
        let descriptors = site_blueprint(&config());
        let order: Vec<String> = descriptors
            .iter()
            .map(|d| d.reference().to_string())
            .collect();

        assert_eq!(
            order,
            vec![
                "policy:example.com-deploy-policy",
                "user:example.com-deployer",
                "bucket:example.com",
                "bucket:app.example.com",
                "certificate:example.com",
                "distribution:example.com",
                "distribution:app.example.com",
                "dns-record:example.com",
                "dns-record:app.example.com",
            ]
        );
    }

    #[test]
    fn test_blueprint_is_valid_sequence() {
        assert!(Sequencer::validate(&site_blueprint(&config())).is_ok());
    }

    #[test]
    fn test_app_distribution_wiring() {
        let descriptors = site_blueprint(&config());
        let app = &descriptors[6];

        let targets: Vec<(&str, String)> = app
            .dependencies
            .iter()
            .map(|d| (d.name.as_str(), d.target.to_string()))
            .collect();
        assert_eq!(
            targets,
            vec![
                (input::ORIGIN, "bucket:app.example.com".to_string()),
                (input::CERTIFICATE, "certificate:example.com".to_string()),
            ]
        );
        assert_eq!(app.config_str("default_root_object"), Some("index.html"));
    }

    #[test]
    fn test_certificate_covers_app_subdomain() {
        let descriptors = site_blueprint(&config());
        let sans: Vec<String> = descriptors[4]
            .get_config("subject_alternative_names")
            .unwrap();
        assert_eq!(sans, vec!["app.example.com".to_string()]);
    }
}
