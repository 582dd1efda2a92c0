//! Evidentry API client
//!
//! One client per service tenancy. The client owns the HTTP connection
//! pool, the bearer token, and the two knobs every confirmation poll made
//! through it shares: the backoff schedule and the maximum poll time. The
//! maximum poll time is consulted fresh on every capacity check, so
//! [`EvidentryClient::set_max_poll_time`] also affects polls already in
//! flight.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::assets::AssetsClient;
use crate::confirm::{BackoffPolicy, BudgetSource, ConfirmationEngine};
use crate::error::{Error, Result};
use crate::sbom::SbomsClient;
use crate::subjects::SubjectsClient;

/// Default ceiling on a single confirmation poll.
pub const DEFAULT_MAX_POLL_TIME: Duration = Duration::from_secs(1200);

/// Client for the Evidentry evidence ledger
pub struct EvidentryClient {
    /// Service base URL, without a trailing slash
    base_url: String,

    /// Bearer token for authentication
    token: String,

    /// Shared connection pool
    http: reqwest::Client,

    /// Backoff schedule used by confirmation polls
    backoff: BackoffPolicy,

    /// Poll-time ceiling shared with in-flight polls
    budget: BudgetSource,
}

impl EvidentryClient {
    /// Creates a client for the given service URL and bearer token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
            http: reqwest::Client::new(),
            backoff: BackoffPolicy::default(),
            budget: BudgetSource::new(DEFAULT_MAX_POLL_TIME),
        }
    }

    /// Replaces the backoff schedule used by confirmation polls.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the maximum poll time at construction.
    pub fn with_max_poll_time(self, ceiling: Duration) -> Self {
        self.budget.set_ceiling(ceiling);
        self
    }

    /// The service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The current maximum poll time.
    pub fn max_poll_time(&self) -> Duration {
        self.budget.ceiling()
    }

    /// Changes the maximum poll time, including for polls already running.
    pub fn set_max_poll_time(&self, ceiling: Duration) {
        self.budget.set_ceiling(ceiling);
    }

    /// Asset operations.
    pub fn assets(&self) -> AssetsClient<'_> {
        AssetsClient::new(self)
    }

    /// Subject operations.
    pub fn subjects(&self) -> SubjectsClient<'_> {
        SubjectsClient::new(self)
    }

    /// SBOM operations.
    pub fn sboms(&self) -> SbomsClient<'_> {
        SbomsClient::new(self)
    }

    pub(crate) fn engine(&self, label: &str) -> ConfirmationEngine {
        ConfirmationEngine::new(self.backoff.clone(), self.budget.clone(), label)
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        Self::into_json(response).await
    }

    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        let response = Self::checked(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await?;
        Self::into_json(response).await
    }

    /// Empty-body POST, used for lifecycle actions like `…:publish`.
    pub(crate) async fn post_action<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .post(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        Self::into_json(response).await
    }

    pub(crate) async fn post_bytes<T: DeserializeOwned>(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await?;
        Self::into_json(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.api_url(path))
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }
        Ok(response)
    }

    async fn into_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::checked(response).await?;
        Ok(response.json().await?)
    }
}
