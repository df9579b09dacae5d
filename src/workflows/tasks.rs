// Task sub-workflow
//
// Tasks move freely between their five statuses; only the actor and the
// parent handover's rejection gate a change. A task update never touches the
// parent handover's status.

use chrono::{DateTime, Utc};

use super::activity_log::ActivityLog;
use super::errors::WorkflowError;
use super::guard::{AuthorizationGuard, GuardDecision};
use crate::handover::{
    Actor, HandoverId, HandoverRequest, TaskActivityEntry, TaskId, TaskStatus,
};

pub const UPDATE_TASK_STATUS: &str = "update_task_status";

/// A validated task status change, ready to be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub handover_id: HandoverId,
    pub task_id: TaskId,
    /// Re-checked against the stored record at commit time
    pub actor: Actor,
    /// Task version the update was planned against
    pub expected_version: u64,
    pub new_status: TaskStatus,
    pub entry: TaskActivityEntry,
}

pub struct TaskTracker;

impl TaskTracker {
    pub fn parse_status(raw: &str) -> Result<TaskStatus, WorkflowError> {
        raw.parse::<TaskStatus>().map_err(|err| {
            let allowed: Vec<&str> = TaskStatus::ALL.iter().map(TaskStatus::as_str).collect();
            WorkflowError::Validation(format!("{err} (expected one of {})", allowed.join(", ")))
        })
    }

    /// Checks authorization and input, then describes the change to commit.
    pub fn plan_update(
        actor: &Actor,
        handover: &HandoverRequest,
        task_id: TaskId,
        new_status: &str,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<TaskUpdate, WorkflowError> {
        let task = handover
            .task(task_id)
            .ok_or(WorkflowError::TaskNotFound(task_id))?;

        if let GuardDecision::Denied { reason } = AuthorizationGuard::can_update_tasks(actor, handover)
        {
            return Err(WorkflowError::Authorization {
                action: UPDATE_TASK_STATUS.to_string(),
                actor: actor.display_name.clone(),
                reason,
            });
        }

        let new_status = Self::parse_status(new_status)?;
        if new_status == task.current_status {
            return Err(WorkflowError::Validation(format!(
                "task is already {new_status}"
            )));
        }

        let comment = comment
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Ok(TaskUpdate {
            handover_id: handover.id,
            task_id,
            actor: actor.clone(),
            expected_version: task.version,
            new_status,
            entry: ActivityLog::task_entry(actor, task.current_status, new_status, comment, at),
        })
    }

    /// Task log oldest first.
    pub fn activity_log(
        handover: &HandoverRequest,
        task_id: TaskId,
    ) -> Result<Vec<TaskActivityEntry>, WorkflowError> {
        handover
            .task(task_id)
            .map(|task| task.activity_log.clone())
            .ok_or(WorkflowError::TaskNotFound(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handover::{
        EmployeeRef, HandoverStatus, HandoverTask, KnowledgeTransfer, WorkflowState,
    };
    use crate::workflows::errors::ErrorKind;

    fn handover_with_task(status: HandoverStatus) -> HandoverRequest {
        HandoverRequest {
            id: HandoverId::new(),
            request_id: "HO-TASKS".to_string(),
            handing_over_employee: EmployeeRef::new("ho", "Harriet"),
            taking_over_employee: EmployeeRef::new("to", "Tomas"),
            line_manager: EmployeeRef::new("lm", "Lena"),
            start_date: None,
            end_date: None,
            workflow: WorkflowState {
                status,
                ..WorkflowState::default()
            },
            knowledge: KnowledgeTransfer::default(),
            tasks: vec![HandoverTask::new("Hand over on-call rota", None)],
            attachments: Vec::new(),
            activity_log: Vec::new(),
            created_at: Utc::now(),
            version: 3,
        }
    }

    #[test]
    fn test_plan_update_builds_entry() {
        let handover = handover_with_task(HandoverStatus::Created);
        let task_id = handover.tasks[0].id;
        let update = TaskTracker::plan_update(
            &Actor::employee("to", "Tomas"),
            &handover,
            task_id,
            "IN_PROGRESS",
            Some(" started "),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(update.new_status, TaskStatus::InProgress);
        assert_eq!(update.expected_version, 0);
        assert_eq!(update.entry.old_status, TaskStatus::NotStarted);
        assert_eq!(update.entry.new_status, TaskStatus::InProgress);
        assert_eq!(update.entry.comment.as_deref(), Some("started"));
    }

    #[test]
    fn test_unknown_status_is_validation_error() {
        let handover = handover_with_task(HandoverStatus::Created);
        let err = TaskTracker::plan_update(
            &Actor::employee("to", "Tomas"),
            &handover,
            handover.tasks[0].id,
            "DONE",
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("NOT_STARTED, IN_PROGRESS"));
    }

    #[test]
    fn test_same_status_is_refused() {
        let handover = handover_with_task(HandoverStatus::Created);
        let err = TaskTracker::plan_update(
            &Actor::admin("root", "Admin"),
            &handover,
            handover.tasks[0].id,
            "NOT_STARTED",
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rejected_handover_blocks_taking_over_party_only() {
        let handover = handover_with_task(HandoverStatus::Rejected);
        let task_id = handover.tasks[0].id;
        let err = TaskTracker::plan_update(
            &Actor::employee("to", "Tomas"),
            &handover,
            task_id,
            "COMPLETED",
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        assert!(TaskTracker::plan_update(
            &Actor::admin("root", "Admin"),
            &handover,
            task_id,
            "COMPLETED",
            None,
            Utc::now(),
        )
        .is_ok());
    }

    #[test]
    fn test_missing_task() {
        let handover = handover_with_task(HandoverStatus::Created);
        let err = TaskTracker::activity_log(&handover, TaskId::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
