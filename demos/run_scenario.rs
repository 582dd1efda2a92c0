//! Execute a YAML scenario against the ledger
//!
//! Usage:
//!   EVIDENTRY_URL=https://ledger.example.com \
//!   EVIDENTRY_TOKEN=... \
//!   cargo run --example run_scenario -- scenario.yaml

use std::path::Path;

use evidentry::{EvidentryClient, Runner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("evidentry=info")
        .init();

    let url = std::env::var("EVIDENTRY_URL")?;
    let token = std::env::var("EVIDENTRY_TOKEN")?;
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: run_scenario <scenario.yaml>")?;

    let client = EvidentryClient::new(url, token);
    let mut runner = Runner::new(&client);

    let report = runner.run_file(Path::new(&path)).await?;
    println!("executed {} steps", report.executed);
    for (alias, identity) in &report.bindings {
        println!("  {alias} → {identity}");
    }

    Ok(())
}
