pub mod plan;
pub mod up;
pub mod validate;

use colored::Colorize;
use sitestack_cloud::CloudProvider;
use sitestack_cloud_aws::AwsProvider;
use sitestack_config::SiteConfig;

/// Where progress lines go; stdout stays clean for machine-readable output
#[derive(Debug, Clone, Copy)]
pub(crate) enum Progress {
    Stdout,
    Stderr,
}

impl Progress {
    pub(crate) fn for_json(json: bool) -> Self {
        if json { Progress::Stderr } else { Progress::Stdout }
    }

    pub(crate) fn line(self, line: impl std::fmt::Display) {
        match self {
            Progress::Stdout => println!("{}", line),
            Progress::Stderr => eprintln!("{}", line),
        }
    }
}

/// Build the AWS provider and make sure the CLI can reach the account
pub(crate) async fn connect(config: &SiteConfig, progress: Progress) -> anyhow::Result<AwsProvider> {
    let provider = AwsProvider::new(&config.region, config.profile.clone());

    progress.line("Checking AWS credentials...".blue());
    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "{} is not authenticated: {}",
            provider.display_name(),
            auth.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    if let Some(account) = &auth.account_info {
        progress.line(format!("  {} {}", "✓".green(), account));
    }

    Ok(provider)
}
