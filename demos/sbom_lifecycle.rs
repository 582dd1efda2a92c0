//! Walk an SBOM through upload → publish → withdraw
//!
//! Usage:
//!   EVIDENTRY_URL=https://ledger.example.com \
//!   EVIDENTRY_TOKEN=... \
//!   cargo run --example sbom_lifecycle -- firmware.spdx.xml

use evidentry::EvidentryClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("evidentry=debug")
        .init();

    let url = std::env::var("EVIDENTRY_URL")?;
    let token = std::env::var("EVIDENTRY_TOKEN")?;
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: sbom_lifecycle <spdx-file>")?;

    let client = EvidentryClient::new(url, token);
    let sboms = client.sboms();

    println!("→ Uploading {path}...");
    let sbom = sboms.upload_confirmed(std::fs::read(&path)?, None).await?;
    println!("  readable as {} ({} {})", sbom.identity, sbom.component, sbom.version);

    println!("→ Publishing...");
    let published = sboms.publish_confirmed(&sbom.identity, None).await?;
    println!("  published at {}", published.published_date);

    println!("→ Withdrawing...");
    let withdrawn = sboms.withdraw_confirmed(&sbom.identity, None).await?;
    println!("  withdrawn at {}", withdrawn.withdrawn_date);

    Ok(())
}
