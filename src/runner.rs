//! Declarative YAML scenario runner
//!
//! Scripts a sequence of ledger calls from a YAML document instead of code:
//!
//! ```yaml
//! steps:
//!   - action: ASSETS_CREATE
//!     alias: firmware
//!     confirm: true
//!     attributes:
//!       arc_display_name: tcl.ccj.003
//!   - action: SBOM_UPLOAD
//!     alias: firmware-sbom
//!     path: firmware.spdx.xml
//!     confirm: true
//!   - action: SBOM_PUBLISH
//!     target: firmware-sbom
//!     confirm: true
//! ```
//!
//! Steps that create a resource may bind an `alias`; later steps reference
//! either an alias or a literal identity in `target`. `confirm: true`
//! routes the step through the matching wait method.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::{AssetCreate, SubjectCreate};
use crate::client::EvidentryClient;
use crate::error::{Error, Result};

/// A parsed scenario: an ordered list of steps.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parses a scenario from YAML text.
    pub fn from_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// One scripted ledger call.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    AssetsCreate {
        #[serde(default)]
        alias: Option<String>,
        #[serde(default)]
        attributes: serde_json::Map<String, serde_json::Value>,
        #[serde(default)]
        confirm: bool,
    },
    AssetsRead {
        target: String,
    },
    SubjectsCreate {
        #[serde(default)]
        alias: Option<String>,
        display_name: String,
        #[serde(default)]
        confirm: bool,
    },
    SbomUpload {
        #[serde(default)]
        alias: Option<String>,
        path: PathBuf,
        #[serde(default)]
        confirm: bool,
    },
    SbomPublish {
        target: String,
        #[serde(default)]
        confirm: bool,
    },
    SbomWithdraw {
        target: String,
        #[serde(default)]
        confirm: bool,
    },
    SetMaxPollTime {
        seconds: u64,
    },
}

/// Summary of an executed scenario.
#[derive(Debug)]
pub struct RunReport {
    /// Number of steps executed.
    pub executed: usize,
    /// Alias → identity bindings accumulated across the run.
    pub bindings: HashMap<String, String>,
}

/// Executes scenarios against one client.
pub struct Runner<'a> {
    client: &'a EvidentryClient,
    bindings: HashMap<String, String>,
}

impl<'a> Runner<'a> {
    pub fn new(client: &'a EvidentryClient) -> Self {
        Self {
            client,
            bindings: HashMap::new(),
        }
    }

    /// Parses and runs a YAML scenario.
    pub async fn run_str(&mut self, yaml: &str) -> Result<RunReport> {
        self.run(Scenario::from_str(yaml)?).await
    }

    /// Reads, parses, and runs a scenario file.
    pub async fn run_file(&mut self, path: &Path) -> Result<RunReport> {
        let yaml = std::fs::read_to_string(path)?;
        self.run_str(&yaml).await
    }

    /// Runs an already-parsed scenario, stopping at the first failing step.
    pub async fn run(&mut self, scenario: Scenario) -> Result<RunReport> {
        let mut executed = 0;
        for step in scenario.steps {
            self.execute(step).await?;
            executed += 1;
        }
        Ok(RunReport {
            executed,
            bindings: self.bindings.clone(),
        })
    }

    async fn execute(&mut self, step: Step) -> Result<()> {
        match step {
            Step::AssetsCreate {
                alias,
                attributes,
                confirm,
            } => {
                let request = AssetCreate { attributes };
                let assets = self.client.assets();
                let asset = if confirm {
                    assets.create_confirmed(&request, None).await?
                } else {
                    assets.create(&request).await?
                };
                tracing::info!(identity = %asset.identity, "created asset");
                self.bind(alias, &asset.identity);
            }
            Step::AssetsRead { target } => {
                let identity = self.resolve(&target)?;
                let asset = self.client.assets().read(&identity).await?;
                tracing::info!(identity = %asset.identity, status = ?asset.confirmation_status, "read asset");
            }
            Step::SubjectsCreate {
                alias,
                display_name,
                confirm,
            } => {
                let request = SubjectCreate::new(display_name);
                let subjects = self.client.subjects();
                let subject = if confirm {
                    subjects.create_confirmed(&request, None).await?
                } else {
                    subjects.create(&request).await?
                };
                tracing::info!(identity = %subject.identity, "created subject");
                self.bind(alias, &subject.identity);
            }
            Step::SbomUpload {
                alias,
                path,
                confirm,
            } => {
                let document = std::fs::read(&path)?;
                let sboms = self.client.sboms();
                let sbom = if confirm {
                    sboms.upload_confirmed(document, None).await?
                } else {
                    sboms.upload(document).await?
                };
                tracing::info!(identity = %sbom.identity, "uploaded sbom");
                self.bind(alias, &sbom.identity);
            }
            Step::SbomPublish { target, confirm } => {
                let identity = self.resolve(&target)?;
                let sboms = self.client.sboms();
                if confirm {
                    sboms.publish_confirmed(&identity, None).await?;
                } else {
                    sboms.publish(&identity).await?;
                }
                tracing::info!(identity = %identity, "published sbom");
            }
            Step::SbomWithdraw { target, confirm } => {
                let identity = self.resolve(&target)?;
                let sboms = self.client.sboms();
                if confirm {
                    sboms.withdraw_confirmed(&identity, None).await?;
                } else {
                    sboms.withdraw(&identity).await?;
                }
                tracing::info!(identity = %identity, "withdrew sbom");
            }
            Step::SetMaxPollTime { seconds } => {
                self.client.set_max_poll_time(Duration::from_secs(seconds));
                tracing::info!(seconds, "set maximum poll time");
            }
        }
        Ok(())
    }

    fn bind(&mut self, alias: Option<String>, identity: &str) {
        if let Some(alias) = alias {
            self.bindings.insert(alias, identity.to_owned());
        }
    }

    /// Aliases resolve through the binding table; anything containing a `/`
    /// is taken as a literal identity.
    fn resolve(&self, target: &str) -> Result<String> {
        if let Some(identity) = self.bindings.get(target) {
            return Ok(identity.clone());
        }
        if target.contains('/') {
            return Ok(target.to_owned());
        }
        Err(Error::UnknownAlias {
            alias: target.to_owned(),
        })
    }
}
