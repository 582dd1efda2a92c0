//! Asset CRUD and confirmation
//!
//! Creating an asset returns immediately with `PENDING` status; the ledger
//! commits it in the background. `wait_for_confirmation` re-reads the asset
//! until the status reaches `CONFIRMED`.

use tokio_util::sync::CancellationToken;

use crate::api::{Asset, AssetCreate, AssetList, ConfirmationStatus};
use crate::client::EvidentryClient;
use crate::confirm::Transition;
use crate::error::Result;

const COLLECTION: &str = "assets";

/// Asset operations, borrowed from an [`EvidentryClient`]
pub struct AssetsClient<'a> {
    client: &'a EvidentryClient,
}

impl<'a> AssetsClient<'a> {
    pub(crate) fn new(client: &'a EvidentryClient) -> Self {
        Self { client }
    }

    /// Creates an asset. The returned record is usually still `PENDING`.
    pub async fn create(&self, request: &AssetCreate) -> Result<Asset> {
        self.client.post_json(COLLECTION, request).await
    }

    /// Creates an asset and waits until the ledger has committed it.
    pub async fn create_confirmed(
        &self,
        request: &AssetCreate,
        cancel: Option<&CancellationToken>,
    ) -> Result<Asset> {
        let created = self.create(request).await?;
        self.wait_for_confirmation(&created.identity, cancel).await
    }

    /// Reads one asset by identity (`assets/<uuid>`).
    pub async fn read(&self, identity: &str) -> Result<Asset> {
        self.client.get_json(identity).await
    }

    /// Lists all assets visible to the caller.
    pub async fn list(&self) -> Result<Vec<Asset>> {
        let list: AssetList = self.client.get_json(COLLECTION).await?;
        Ok(list.assets)
    }

    /// Re-reads the asset until `confirmation_status` is `CONFIRMED`,
    /// returning the confirmed record. Gives up with
    /// [`Error::ConfirmationTimeout`](crate::Error::ConfirmationTimeout)
    /// once the client's maximum poll time is exhausted.
    pub async fn wait_for_confirmation(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Asset> {
        self.client
            .engine(COLLECTION)
            .poll(
                identity,
                Transition::Confirmation,
                || self.client.get_json::<Asset>(identity),
                |asset| asset.confirmation_status == ConfirmationStatus::Confirmed,
                cancel,
            )
            .await
    }
}
