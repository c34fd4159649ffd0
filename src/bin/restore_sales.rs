//! Restores list prices on products whose sale has ended.
//!
//! Run by hand or from cron; the server never ends sales on its own.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use storefront::{repo, services::sales, Config, EventPublisher};

#[derive(Parser, Debug)]
#[command(name = "restore-sales", about = "Restore list prices of products whose sale has expired")]
struct Args {
    /// List the products that would be restored without changing them
    #[arg(long)]
    dry_run: bool,

    /// Treat this instant (RFC 3339) as the current time
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();
    storefront::init_tracing();

    let config = Config::from_env()?;
    let db = repo::connect(&config).await?;
    let events = EventPublisher::connect(config.nats_url.as_deref()).await;

    let report = sales::restore_expired(&db, &events, args.at.unwrap_or_else(Utc::now), args.dry_run).await?;
    for sale in &report.restored {
        let verb = if report.dry_run { "would restore" } else { "restored" };
        println!("{verb} {} to {}", sale.product_id, sale.price);
    }
    println!("{} product(s)", report.restored.len());
    Ok(())
}
