//! # Evidentry Rust Client
//!
//! Async client for the Evidentry evidence ledger: CRUD calls for assets,
//! subjects, and SBOM records, plus a declarative YAML runner for scripting
//! sequences of calls.
//!
//! ## Eventual consistency
//!
//! The ledger commits writes asynchronously: a create or lifecycle action
//! returns before the change is durably visible to third parties. Every
//! operation that needs the committed state shares one confirmation engine:
//!
//! - re-read the resource until its terminal-state predicate holds
//! - space re-reads by exponential backoff ([`BackoffPolicy`])
//! - bound the whole poll by the client's maximum poll time
//!   ([`BudgetSource`]), which may be changed while a poll is running
//! - give up with a typed, transition-specific error (`ConfirmationTimeout`,
//!   `UploadTimeout`, `PublicationTimeout`, `WithdrawalTimeout`) carrying
//!   the identity and the elapsed time
//!
//! Polls can be aborted through a [`tokio_util::sync::CancellationToken`],
//! which yields a distinct `Cancelled` error rather than a timeout.
//!
//! ## Example
//!
//! ```rust,ignore
//! use evidentry::{AssetCreate, EvidentryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EvidentryClient::new("https://ledger.example.com", "api-token");
//!
//!     // Create an asset and wait for the ledger to commit it.
//!     let request = AssetCreate::new().attribute("arc_display_name", "tcl.ccj.003");
//!     let asset = client.assets().create_confirmed(&request, None).await?;
//!     println!("confirmed: {}", asset.identity);
//!
//!     // Upload an SBOM, wait until it is readable, then publish it.
//!     let sbom = client.sboms().upload_confirmed(std::fs::read("fw.spdx.xml")?, None).await?;
//!     client.sboms().publish_confirmed(&sbom.identity, None).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assets;
pub mod client;
pub mod confirm;
pub mod error;
pub mod runner;
pub mod sbom;
pub mod subjects;

pub use api::{
    Asset, AssetCreate, ConfirmationStatus, SbomMetadata, Subject, SubjectCreate,
};
pub use client::{EvidentryClient, DEFAULT_MAX_POLL_TIME};
pub use confirm::{BackoffPolicy, BudgetSource, ConfirmationEngine, Transition};
pub use error::{Error, Result};
pub use runner::{RunReport, Runner, Scenario};
