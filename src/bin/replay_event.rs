use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use jobber_ghl_sync::config;
use jobber_ghl_sync::crm::GhlClient;
use jobber_ghl_sync::model::JobberEvent;
use jobber_ghl_sync::sync::{sync_contact, SyncOutcome};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run a saved Jobber webhook payload through the GHL sync"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// JSON file holding one webhook body
    #[arg(long)]
    file: PathBuf,

    /// Only print the tag the event maps to; do not call GHL
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let event: JobberEvent = serde_json::from_str(&raw).context("invalid webhook JSON")?;

    if args.dry_run {
        match event.tag() {
            Some(tag) => println!("{}", tag),
            None => println!("(no tag)"),
        }
        return Ok(());
    }

    let cfg = config::load(Some(&args.config))?;
    let client = GhlClient::new(&cfg.ghl)?;

    info!(file = %args.file.display(), "replaying webhook");
    match sync_contact(&client, &event).await? {
        SyncOutcome::Skipped => println!("No tag matched, skipped"),
        SyncOutcome::Tagged {
            tag,
            contact_id,
            created,
        } => {
            let verb = if created { "created" } else { "existing" };
            println!("Applied '{}' to {} contact {}", tag, verb, contact_id);
        }
    }
    Ok(())
}
