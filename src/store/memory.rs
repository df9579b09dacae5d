use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::{
    apply_task_commit, apply_transition_commit, CommitOutcome, HandoverStore, StoreError,
};
use crate::handover::{HandoverActivityEntry, HandoverId, HandoverRequest, TaskId, WorkflowState};
use crate::workflows::TaskUpdate;

/// Process-local store; readers get clones taken under the read lock.
#[derive(Debug, Default)]
pub struct InMemoryHandoverStore {
    records: RwLock<HashMap<HandoverId, HandoverRequest>>,
}

impl InMemoryHandoverStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing records, e.g. imported from another system.
    pub fn with_records(records: impl IntoIterator<Item = HandoverRequest>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

#[async_trait]
impl HandoverStore for InMemoryHandoverStore {
    async fn insert(&self, handover: HandoverRequest) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&handover.id) {
            return Err(StoreError::Duplicate(handover.id));
        }
        debug!(handover_id = %handover.id, "Inserted handover into memory store");
        records.insert(handover.id, handover);
        Ok(())
    }

    async fn fetch(&self, id: HandoverId) -> Result<Option<HandoverRequest>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<HandoverRequest>, StoreError> {
        let mut all: Vec<HandoverRequest> = self.records.read().await.values().cloned().collect();
        all.sort_by_key(|record| record.created_at);
        Ok(all)
    }

    async fn find_task_owner(&self, task_id: TaskId) -> Result<Option<HandoverId>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|record| record.task(task_id).is_some())
            .map(|record| record.id))
    }

    async fn commit_transition(
        &self,
        id: HandoverId,
        expected_version: u64,
        workflow: WorkflowState,
        entry: HandoverActivityEntry,
    ) -> Result<CommitOutcome, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::HandoverMissing(id))?;
        Ok(apply_transition_commit(record, expected_version, workflow, entry))
    }

    async fn commit_task(&self, update: TaskUpdate) -> Result<CommitOutcome, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&update.handover_id)
            .ok_or(StoreError::HandoverMissing(update.handover_id))?;
        apply_task_commit(record, update)
    }
}
