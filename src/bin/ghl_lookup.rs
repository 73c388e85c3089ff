use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use jobber_ghl_sync::config;
use jobber_ghl_sync::crm::GhlClient;

#[derive(Parser, Debug)]
#[command(about = "Look up a GHL contact by email")]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Email address to look up
    #[arg(long)]
    email: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let cfg = config::load(Some(&args.config))?;
    let client = GhlClient::new(&cfg.ghl)?;

    match client.find_contact_by_email(&args.email).await? {
        Some(contact) => {
            println!("Contact ID: {}", contact.id);
            println!("  email: {}", contact.email.as_deref().unwrap_or("-"));
            println!("  first name: {}", contact.first_name.as_deref().unwrap_or("-"));
            println!("  last name: {}", contact.last_name.as_deref().unwrap_or("-"));
        }
        None => println!("No contact found for {}", args.email),
    }
    Ok(())
}
