// Persistence contract for handover records
//
// Backends commit with compare-and-swap on version counters: the record's
// `version` for transitions, the task's `version` for task updates. Task
// commits also re-check the actor's right to change tasks against the record
// as stored. A commit either applies completely or reports why it was refused
// and changes nothing.

use async_trait::async_trait;
use thiserror::Error;

use crate::handover::{
    HandoverActivityEntry, HandoverId, HandoverRequest, TaskId, WorkflowState,
};
use crate::workflows::{AuthorizationGuard, DenialReason, GuardDecision, TaskUpdate};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Errors that can occur in a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Handover {0} already exists")]
    Duplicate(HandoverId),

    #[error("Handover {0} is not in the store")]
    HandoverMissing(HandoverId),

    #[error("Task {task_id} is not part of handover {handover_id}")]
    TaskMissing {
        handover_id: HandoverId,
        task_id: TaskId,
    },

    #[error("Unsupported store format version {found}, expected {expected}")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("Store worker failed: {0}")]
    WorkerFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The change was applied; carries the record as now stored
    Committed(HandoverRequest),
    /// Someone else committed first; nothing was changed
    VersionMismatch { current_version: u64 },
    /// The record changed so that the actor may no longer make the change
    AccessRevoked { reason: DenialReason },
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait HandoverStore: Send + Sync {
    /// Store a new record; fails with `Duplicate` if the id is taken.
    async fn insert(&self, handover: HandoverRequest) -> Result<(), StoreError>;

    /// Consistent snapshot of one record.
    async fn fetch(&self, id: HandoverId) -> Result<Option<HandoverRequest>, StoreError>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<HandoverRequest>, StoreError>;

    async fn find_task_owner(&self, task_id: TaskId) -> Result<Option<HandoverId>, StoreError>;

    /// Replace the workflow fields and append `entry` if the record is still
    /// at `expected_version`.
    async fn commit_transition(
        &self,
        id: HandoverId,
        expected_version: u64,
        workflow: WorkflowState,
        entry: HandoverActivityEntry,
    ) -> Result<CommitOutcome, StoreError>;

    /// Apply a task status change if the task is still at
    /// `update.expected_version` and `update.actor` may still change tasks.
    async fn commit_task(&self, update: TaskUpdate) -> Result<CommitOutcome, StoreError>;
}

/// Shared commit logic so every backend applies transitions identically.
pub(crate) fn apply_transition_commit(
    record: &mut HandoverRequest,
    expected_version: u64,
    workflow: WorkflowState,
    entry: HandoverActivityEntry,
) -> CommitOutcome {
    if record.version != expected_version {
        return CommitOutcome::VersionMismatch {
            current_version: record.version,
        };
    }
    record.workflow = workflow;
    record.activity_log.push(entry);
    record.version += 1;
    CommitOutcome::Committed(record.clone())
}

pub(crate) fn apply_task_commit(
    record: &mut HandoverRequest,
    update: TaskUpdate,
) -> Result<CommitOutcome, StoreError> {
    if let GuardDecision::Denied { reason } = AuthorizationGuard::can_update_tasks(&update.actor, record)
    {
        return Ok(CommitOutcome::AccessRevoked { reason });
    }

    let handover_id = record.id;
    let task = record
        .tasks
        .iter_mut()
        .find(|task| task.id == update.task_id)
        .ok_or(StoreError::TaskMissing {
            handover_id,
            task_id: update.task_id,
        })?;

    if task.version != update.expected_version {
        return Ok(CommitOutcome::VersionMismatch {
            current_version: task.version,
        });
    }
    task.current_status = update.new_status;
    task.activity_log.push(update.entry);
    task.version += 1;
    Ok(CommitOutcome::Committed(record.clone()))
}
