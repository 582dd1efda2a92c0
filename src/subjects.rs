//! Subject CRUD and confirmation
//!
//! Subjects follow the same commit lifecycle as assets: created `PENDING`,
//! confirmed asynchronously.

use tokio_util::sync::CancellationToken;

use crate::api::{ConfirmationStatus, Subject, SubjectCreate, SubjectList};
use crate::client::EvidentryClient;
use crate::confirm::Transition;
use crate::error::Result;

const COLLECTION: &str = "subjects";

/// Subject operations, borrowed from an [`EvidentryClient`]
pub struct SubjectsClient<'a> {
    client: &'a EvidentryClient,
}

impl<'a> SubjectsClient<'a> {
    pub(crate) fn new(client: &'a EvidentryClient) -> Self {
        Self { client }
    }

    /// Creates a subject. The returned record is usually still `PENDING`.
    pub async fn create(&self, request: &SubjectCreate) -> Result<Subject> {
        self.client.post_json(COLLECTION, request).await
    }

    /// Creates a subject and waits until the ledger has committed it.
    pub async fn create_confirmed(
        &self,
        request: &SubjectCreate,
        cancel: Option<&CancellationToken>,
    ) -> Result<Subject> {
        let created = self.create(request).await?;
        self.wait_for_confirmation(&created.identity, cancel).await
    }

    /// Reads one subject by identity (`subjects/<uuid>`).
    pub async fn read(&self, identity: &str) -> Result<Subject> {
        self.client.get_json(identity).await
    }

    /// Lists all subjects visible to the caller.
    pub async fn list(&self) -> Result<Vec<Subject>> {
        let list: SubjectList = self.client.get_json(COLLECTION).await?;
        Ok(list.subjects)
    }

    /// Deletes a subject.
    pub async fn delete(&self, identity: &str) -> Result<()> {
        self.client.delete(identity).await
    }

    /// Re-reads the subject until `confirmation_status` is `CONFIRMED`.
    pub async fn wait_for_confirmation(
        &self,
        identity: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Subject> {
        self.client
            .engine(COLLECTION)
            .poll(
                identity,
                Transition::Confirmation,
                || self.client.get_json::<Subject>(identity),
                |subject| subject.confirmation_status == ConfirmationStatus::Confirmed,
                cancel,
            )
            .await
    }
}
