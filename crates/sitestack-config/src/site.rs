//! Site settings: layered partial values and the resolved configuration

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
pub const DEFAULT_ERROR_DOCUMENT: &str = "error.html";

/// One layer of site settings (file, environment or command line)
///
/// Every field is optional; layers are merged with [`SiteSettings::merge`]
/// and turned into a [`SiteConfig`] by [`SiteSettings::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    pub bucket_name: Option<String>,
    pub app_bucket_name: Option<String>,
    pub domain_name: Option<String>,
    pub app_subdomain: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub user_name: Option<String>,
    pub policy_name: Option<String>,
    pub index_document: Option<String>,
    pub error_document: Option<String>,
}

impl SiteSettings {
    /// Overlay `upper` on top of `self`; values present in `upper` win
    pub fn merge(self, upper: SiteSettings) -> Self {
        Self {
            bucket_name: upper.bucket_name.or(self.bucket_name),
            app_bucket_name: upper.app_bucket_name.or(self.app_bucket_name),
            domain_name: upper.domain_name.or(self.domain_name),
            app_subdomain: upper.app_subdomain.or(self.app_subdomain),
            region: upper.region.or(self.region),
            profile: upper.profile.or(self.profile),
            user_name: upper.user_name.or(self.user_name),
            policy_name: upper.policy_name.or(self.policy_name),
            index_document: upper.index_document.or(self.index_document),
            error_document: upper.error_document.or(self.error_document),
        }
    }

    /// Read the `SITESTACK_*` variables from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a layer from an arbitrary variable lookup
    ///
    /// Empty values are treated as unset. `AWS_REGION` is used when
    /// `SITESTACK_REGION` is not present.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            bucket_name: get("SITESTACK_BUCKET_NAME"),
            app_bucket_name: get("SITESTACK_APP_BUCKET_NAME"),
            domain_name: get("SITESTACK_DOMAIN_NAME"),
            app_subdomain: get("SITESTACK_APP_SUBDOMAIN"),
            region: get("SITESTACK_REGION").or_else(|| get("AWS_REGION")),
            profile: get("SITESTACK_PROFILE"),
            ..Self::default()
        }
    }

    /// Fill derived values and validate everything
    pub fn resolve(self) -> Result<SiteConfig> {
        let bucket_name = required("bucket_name", self.bucket_name)?.to_lowercase();
        validate_bucket_name("bucket_name", &bucket_name)?;

        let domain_name = normalize_host(&required("domain_name", self.domain_name)?);
        validate_hostname("domain_name", &domain_name)?;

        let region = required("region", self.region)?;
        if !region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ConfigError::InvalidValue {
                field: "region",
                reason: format!("'{}' is not a region name", region),
            });
        }

        let app_bucket_name = match optional("app_bucket_name", self.app_bucket_name)? {
            Some(name) => name.to_lowercase(),
            None => format!("app.{}", bucket_name),
        };
        validate_bucket_name("app_bucket_name", &app_bucket_name)?;

        let app_subdomain = match optional("app_subdomain", self.app_subdomain)? {
            Some(host) => normalize_host(&host),
            None => format!("app.{}", domain_name),
        };
        validate_hostname("app_subdomain", &app_subdomain)?;

        if app_bucket_name == bucket_name {
            return Err(ConfigError::InvalidValue {
                field: "app_bucket_name",
                reason: "must differ from bucket_name".to_string(),
            });
        }
        if app_subdomain == domain_name {
            return Err(ConfigError::InvalidValue {
                field: "app_subdomain",
                reason: "must differ from domain_name".to_string(),
            });
        }

        let user_name = optional("user_name", self.user_name)?
            .unwrap_or_else(|| format!("{}-deployer", bucket_name));
        let policy_name = optional("policy_name", self.policy_name)?
            .unwrap_or_else(|| format!("{}-deploy-policy", bucket_name));

        Ok(SiteConfig {
            bucket_name,
            app_bucket_name,
            domain_name,
            app_subdomain,
            region,
            profile: optional("profile", self.profile)?,
            user_name,
            policy_name,
            index_document: optional("index_document", self.index_document)?
                .unwrap_or_else(|| DEFAULT_INDEX_DOCUMENT.to_string()),
            error_document: optional("error_document", self.error_document)?
                .unwrap_or_else(|| DEFAULT_ERROR_DOCUMENT.to_string()),
        })
    }
}

/// Fully resolved and validated site configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteConfig {
    pub bucket_name: String,
    pub app_bucket_name: String,
    pub domain_name: String,
    pub app_subdomain: String,
    pub region: String,
    pub profile: Option<String>,
    pub user_name: String,
    pub policy_name: String,
    pub index_document: String,
    pub error_document: String,
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingValue(field)),
    }
}

/// Present-but-blank is an error; absent is fine
fn optional(field: &'static str, value: Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => required(field, Some(v)).map(Some),
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_lowercase()
}

fn validate_hostname(field: &'static str, host: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field,
        reason: format!("'{}' {}", host, reason),
    };

    if host.len() > 253 {
        return Err(invalid("is longer than 253 characters"));
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid("needs at least two labels"));
    }

    for label in labels {
        if label.is_empty() || label.len() > 63 {
            return Err(invalid("has an empty or oversized label"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("has a label starting or ending with '-'"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid("contains characters not allowed in a hostname"));
        }
    }

    Ok(())
}

fn validate_bucket_name(field: &'static str, name: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field,
        reason: format!("'{}' {}", name, reason),
    };

    if !(3..=63).contains(&name.len()) {
        return Err(invalid("must be 3-63 characters long"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(invalid("may only contain lowercase letters, digits, '.' and '-'"));
    }
    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !edge_ok(name.chars().next()) || !edge_ok(name.chars().last()) {
        return Err(invalid("must start and end with a letter or digit"));
    }
    if name.contains("..") {
        return Err(invalid("must not contain '..'"));
    }

    Ok(())
}
