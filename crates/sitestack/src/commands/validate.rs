use colored::Colorize;
use sitestack_cloud::site_blueprint;
use sitestack_config::SiteConfig;

pub fn handle(config: &SiteConfig) -> anyhow::Result<()> {
    println!("{}", "✓ Configuration is valid".green().bold());
    println!();
    println!("  bucket:         {}", config.bucket_name.cyan());
    println!("  app bucket:     {}", config.app_bucket_name.cyan());
    println!("  domain:         {}", config.domain_name.cyan());
    println!("  app subdomain:  {}", config.app_subdomain.cyan());
    println!("  region:         {}", config.region.cyan());
    println!(
        "  profile:        {}",
        config.profile.as_deref().unwrap_or("(default)").cyan()
    );
    println!("  deploy user:    {}", config.user_name);
    println!("  deploy policy:  {}", config.policy_name);
    println!(
        "  documents:      {} / {}",
        config.index_document, config.error_document
    );

    println!();
    println!("Resources:");
    for descriptor in site_blueprint(config) {
        println!("  - {} {}", descriptor.kind, descriptor.key.cyan());
    }

    Ok(())
}
