use super::Progress;
use colored::Colorize;
use sitestack_cloud::{Sequencer, site_blueprint};
use sitestack_config::SiteConfig;

pub async fn handle(config: &SiteConfig, json: bool) -> anyhow::Result<()> {
    let progress = Progress::for_json(json);
    let provider = super::connect(config, progress).await?;
    let descriptors = site_blueprint(config);

    progress.line(format!(
        "{} {} ({} resources)",
        "Provisioning".blue().bold(),
        config.domain_name.cyan(),
        descriptors.len()
    ));

    let manifest = Sequencer::new(&provider).run(&descriptors).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        println!();
        println!("{}", manifest);
        println!(
            "{} done in {} ms",
            "✓".green().bold(),
            manifest.duration_ms
        );
    }

    Ok(())
}
