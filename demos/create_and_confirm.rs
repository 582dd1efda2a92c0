//! Create an asset and wait for the ledger to commit it
//!
//! Usage:
//!   EVIDENTRY_URL=https://ledger.example.com \
//!   EVIDENTRY_TOKEN=... \
//!   cargo run --example create_and_confirm

use std::time::Duration;

use evidentry::{AssetCreate, BackoffPolicy, EvidentryClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("evidentry=debug")
        .init();

    let url = std::env::var("EVIDENTRY_URL")?;
    let token = std::env::var("EVIDENTRY_TOKEN")?;

    let backoff = BackoffPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(10))?
        .with_jitter(0.25)?;
    let client = EvidentryClient::new(url, token)
        .with_backoff(backoff)
        .with_max_poll_time(Duration::from_secs(300));

    let request = AssetCreate::new()
        .attribute("arc_display_name", "demo-asset")
        .attribute("arc_firmware_version", "1.0");

    println!("→ Creating asset...");
    let asset = client.assets().create(&request).await?;
    println!("  created {} ({:?})", asset.identity, asset.confirmation_status);

    println!("→ Waiting for confirmation...");
    let confirmed = client
        .assets()
        .wait_for_confirmation(&asset.identity, None)
        .await?;
    println!("  confirmed {} ({:?})", confirmed.identity, confirmed.confirmation_status);

    Ok(())
}
