use colored::Colorize;
use sitestack_cloud::{ActionType, Sequencer, site_blueprint};
use sitestack_config::SiteConfig;

pub async fn handle(config: &SiteConfig) -> anyhow::Result<()> {
    let provider = super::connect(config, super::Progress::Stdout).await?;

    let plan = Sequencer::new(&provider)
        .plan(&site_blueprint(config))
        .await?;

    println!();
    for action in &plan.actions {
        match action.action_type {
            ActionType::Create => println!("  {} {}", "+".green().bold(), action.description),
            ActionType::NoOp => println!("  {} {}", "=".dimmed(), action.description.dimmed()),
        }
    }

    println!();
    if plan.has_changes {
        println!("{}", plan.summary().to_string().bold());
    } else {
        println!("{}", "✓ Everything already exists".green().bold());
    }

    Ok(())
}
