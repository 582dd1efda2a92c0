//! SBOM upload, publication, and withdrawal
//!
//! An SBOM moves through three asynchronous transitions, each with its own
//! wait method:
//!
//! - **upload**: the metadata record only exists once the ingest pipeline
//!   has processed the document, so reads return HTTP 404 until then and
//!   `wait_until_uploaded` treats 404 as "not yet"
//! - **publication**: `published_date` becomes non-empty
//! - **withdrawal**: `withdrawn_date` becomes non-empty

use tokio_util::sync::CancellationToken;

use crate::api::{SbomList, SbomMetadata};
use crate::client::EvidentryClient;
use crate::confirm::Transition;
use crate::error::Result;

const COLLECTION: &str = "sboms";

/// SBOM operations, borrowed from an [`EvidentryClient`]
pub struct SbomsClient<'a> {
    client: &'a EvidentryClient,
}

impl<'a> SbomsClient<'a> {
    pub(crate) fn new(client: &'a EvidentryClient) -> Self {
        Self { client }
    }

    /// Uploads an SPDX document. The returned metadata names the record,
    /// but the record itself may not be readable until ingest completes.
    pub async fn upload(&self, document: Vec<u8>) -> Result<SbomMetadata> {
        self.client
            .post_bytes(COLLECTION, "text/xml", document)
            .await
    }

    /// Uploads an SPDX document and waits until the record is readable.
    pub async fn upload_confirmed(
        &self,
        document: Vec<u8>,
        cancel: Option<&CancellationToken>,
    ) -> Result<SbomMetadata> {
        let uploaded = self.upload(document).await?;
        self.wait_until_uploaded(&uploaded.identity, cancel).await
    }

    /// Reads the metadata record for one SBOM (`sboms/<uuid>`).
    pub async fn metadata(&self, identity: &str) -> Result<SbomMetadata> {
        self.metadata_read(identity).await
    }

    /// Downloads the stored SPDX document.
    pub async fn download(&self, identity: &str) -> Result<Vec<u8>> {
        self.client.get_bytes(identity).await
    }

    /// Lists metadata for all SBOMs visible to the caller.
    pub async fn list(&self) -> Result<Vec<SbomMetadata>> {
        let list: SbomList = self.client.get_json(COLLECTION).await?;
        Ok(list.sboms)
    }

    /// Requests publication. The date lands asynchronously.
    pub async fn publish(&self, identity: &str) -> Result<SbomMetadata> {
        self.client.post_action(&format!("{identity}:publish")).await
    }

    /// Requests publication and waits for the publication date.
    pub async fn publish_confirmed(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SbomMetadata> {
        self.publish(identity).await?;
        self.wait_until_published(identity, cancel).await
    }

    /// Requests withdrawal. The date lands asynchronously.
    pub async fn withdraw(&self, identity: &str) -> Result<SbomMetadata> {
        self.client
            .post_action(&format!("{identity}:withdraw"))
            .await
    }

    /// Requests withdrawal and waits for the withdrawal date.
    pub async fn withdraw_confirmed(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SbomMetadata> {
        self.withdraw(identity).await?;
        self.wait_until_withdrawn(identity, cancel).await
    }

    /// Re-reads the metadata record until it exists at all. A successful
    /// read is itself the terminal signal; HTTP 404 means "not yet".
    pub async fn wait_until_uploaded(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SbomMetadata> {
        self.client
            .engine(COLLECTION)
            .poll(
                identity,
                Transition::Upload,
                || self.metadata_read(identity),
                |_| true,
                cancel,
            )
            .await
    }

    /// Re-reads the metadata record until `published_date` is non-empty.
    pub async fn wait_until_published(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SbomMetadata> {
        self.client
            .engine(COLLECTION)
            .poll(
                identity,
                Transition::Publication,
                || self.metadata_read(identity),
                SbomMetadata::is_published,
                cancel,
            )
            .await
    }

    /// Re-reads the metadata record until `withdrawn_date` is non-empty.
    pub async fn wait_until_withdrawn(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SbomMetadata> {
        self.client
            .engine(COLLECTION)
            .poll(
                identity,
                Transition::Withdrawal,
                || self.metadata_read(identity),
                SbomMetadata::is_withdrawn,
                cancel,
            )
            .await
    }

    async fn metadata_read(&self, identity: &str) -> Result<SbomMetadata> {
        self.client.get_json(&format!("{identity}/metadata")).await
    }
}
