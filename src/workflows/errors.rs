use thiserror::Error;

use super::guard::DenialReason;
use crate::handover::{HandoverId, TaskId};
use crate::store::StoreError;

/// Errors surfaced by the handover workflow engine.
///
/// Every variant is recoverable by the caller; a failed operation never leaves
/// a partially applied transition behind.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{actor} may not {action}: {reason}")]
    Authorization {
        action: String,
        actor: String,
        reason: DenialReason,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Handover {handover_id} changed concurrently, reload it and retry")]
    Conflict {
        handover_id: HandoverId,
        task_id: Option<TaskId>,
    },

    #[error("Handover {0} not found")]
    HandoverNotFound(HandoverId),

    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Store error: {0}")]
    Store(StoreError),
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authorization,
    Validation,
    Conflict,
    NotFound,
    Store,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Authorization { .. } => ErrorKind::Authorization,
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::Conflict { .. } => ErrorKind::Conflict,
            WorkflowError::HandoverNotFound(_) | WorkflowError::TaskNotFound(_) => {
                ErrorKind::NotFound
            }
            WorkflowError::Store(_) => ErrorKind::Store,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::HandoverMissing(id) => WorkflowError::HandoverNotFound(id),
            StoreError::TaskMissing { task_id, .. } => WorkflowError::TaskNotFound(task_id),
            other => WorkflowError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handover::Role;

    #[test]
    fn test_authorization_message_names_actor_and_reason() {
        let err = WorkflowError::Authorization {
            action: "reject".to_string(),
            actor: "Tomas".to_string(),
            reason: DenialReason::WrongRole {
                required: Role::LineManager,
                actual: Role::TakingOver,
            },
        };
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(
            err.to_string(),
            "Tomas may not reject: only the line manager may do this, actor is the taking-over party"
        );
    }

    #[test]
    fn test_missing_records_map_to_not_found() {
        let id = HandoverId::new();
        let err: WorkflowError = StoreError::HandoverMissing(id).into();
        assert!(err.is_not_found());

        let err: WorkflowError = StoreError::Duplicate(id).into();
        assert_eq!(err.kind(), ErrorKind::Store);
    }
}
