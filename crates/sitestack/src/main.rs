mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use sitestack_cloud::CloudError;
use sitestack_config::SiteSettings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitestack")]
#[command(about = "Provision a static website stack on AWS, idempotently", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure every resource of the stack exists
    Up {
        #[command(flatten)]
        site: SiteArgs,
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which resources exist and which would be created
    Plan {
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Resolve and print the configuration without calling AWS
    Validate {
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Show version information
    Version,
}

/// Site settings given on the command line; they override file and environment
#[derive(Args, Debug, Default)]
struct SiteArgs {
    /// Config file (default: ./sitestack.yaml, ./.sitestack.yaml, ~/.config/sitestack/sitestack.yaml)
    #[arg(short, long, env = "SITESTACK_CONFIG")]
    config: Option<PathBuf>,
    /// Bucket holding the site content
    #[arg(long)]
    bucket_name: Option<String>,
    /// Bucket holding the app content (default: app.<bucket-name>)
    #[arg(long)]
    app_bucket_name: Option<String>,
    /// Apex domain of the site
    #[arg(long)]
    domain_name: Option<String>,
    /// App subdomain (default: app.<domain-name>)
    #[arg(long)]
    app_subdomain: Option<String>,
    /// AWS region for the buckets
    #[arg(long)]
    region: Option<String>,
    /// Named aws CLI profile
    #[arg(long)]
    profile: Option<String>,
}

impl SiteArgs {
    fn overrides(&self) -> SiteSettings {
        SiteSettings {
            bucket_name: self.bucket_name.clone(),
            app_bucket_name: self.app_bucket_name.clone(),
            domain_name: self.domain_name.clone(),
            app_subdomain: self.app_subdomain.clone(),
            region: self.region.clone(),
            profile: self.profile.clone(),
            ..SiteSettings::default()
        }
    }

    fn load(&self) -> Result<sitestack_config::SiteConfig, CloudError> {
        Ok(sitestack_config::load_with(
            self.config.as_deref(),
            self.overrides(),
        )?)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Up { site, json } => {
            let config = site.load()?;
            commands::up::handle(&config, json).await?;
        }
        Commands::Plan { site } => {
            let config = site.load()?;
            commands::plan::handle(&config).await?;
        }
        Commands::Validate { site } => {
            let config = site.load()?;
            commands::validate::handle(&config)?;
        }
        Commands::Version => {
            println!("sitestack {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn report(e: &anyhow::Error) {
    eprintln!();
    match e.downcast_ref::<CloudError>() {
        Some(CloudError::InvalidConfig(msg)) => {
            eprintln!("{}", "✗ Configuration error".red().bold());
            eprintln!("  {}", msg);
        }
        Some(CloudError::Provider {
            kind,
            key,
            operation,
            message,
        }) => {
            eprintln!(
                "{} {} {} '{}'",
                "✗ Failed to".red().bold(),
                operation.to_string().red().bold(),
                kind,
                key.cyan()
            );
            eprintln!("  {}", message);
        }
        Some(CloudError::DependencyUnavailable {
            kind,
            key,
            dependency,
        }) => {
            eprintln!(
                "{} {} '{}'",
                "✗ Missing dependency for".red().bold(),
                kind,
                key.cyan()
            );
            eprintln!("  {}", dependency);
        }
        _ => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
    }
}
