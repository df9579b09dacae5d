// Handover workflow engine
//
// Every write follows the same shape: take the per-key lock, read a snapshot,
// evaluate the guard, compute the new state, commit against the snapshot's
// version. A commit that loses the version race is reported as a conflict
// and leaves the stored record untouched.

use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

use super::activity_log::ActivityLog;
use super::errors::WorkflowError;
use super::guard::{AuthorizationGuard, GuardDecision};
use super::locks::KeyedLocks;
use super::state_machine::validate_comment;
use super::tasks::TaskTracker;
use crate::config::WorkflowConfig;
use crate::handover::{
    Actor, HandoverAction, HandoverActivityEntry, HandoverDraft, HandoverId, HandoverRequest,
    HandoverTask, TaskActivityEntry, TaskId, WorkflowState,
};
use crate::observability::{OperationTimer, WorkflowMetrics};
use crate::store::{CommitOutcome, HandoverStore};
use crate::telemetry::{create_transition_span, generate_correlation_id};

/// One action the actor may invoke right now
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AvailableAction {
    pub action: HandoverAction,
    pub allowed_reason: String,
    pub requires_comment: bool,
}

pub struct HandoverWorkflowEngine {
    store: Arc<dyn HandoverStore>,
    handover_locks: KeyedLocks<HandoverId>,
    task_locks: KeyedLocks<TaskId>,
    metrics: Arc<WorkflowMetrics>,
    settings: WorkflowConfig,
}

impl HandoverWorkflowEngine {
    pub fn new(store: Arc<dyn HandoverStore>) -> Self {
        Self {
            store,
            handover_locks: KeyedLocks::new(),
            task_locks: KeyedLocks::new(),
            metrics: Arc::new(WorkflowMetrics::new()),
            settings: WorkflowConfig::default(),
        }
    }

    pub fn with_settings(mut self, settings: WorkflowConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn metrics(&self) -> Arc<WorkflowMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Validate a draft and store it as a new handover in `CREATED`.
    pub async fn create_handover(
        &self,
        draft: HandoverDraft,
        actor: &Actor,
    ) -> Result<HandoverRequest, WorkflowError> {
        let handover = match Self::build_handover(draft) {
            Ok(handover) => handover,
            Err(err) => {
                self.metrics.record_validation_failure();
                return Err(err);
            }
        };
        self.store.insert(handover.clone()).await?;
        info!(
            handover_id = %handover.id,
            request_id = %handover.request_id,
            created_by = %actor.employee_id,
            tasks = handover.tasks.len(),
            "Handover created"
        );
        Ok(handover)
    }

    fn build_handover(draft: HandoverDraft) -> Result<HandoverRequest, WorkflowError> {
        let parties = [
            ("handing-over employee", &draft.handing_over_employee),
            ("taking-over employee", &draft.taking_over_employee),
            ("line manager", &draft.line_manager),
        ];
        for (label, party) in parties {
            if party.id.as_str().trim().is_empty() || party.name.trim().is_empty() {
                return Err(WorkflowError::Validation(format!(
                    "{label} needs an id and a name"
                )));
            }
        }
        let distinct: HashSet<&str> = parties.iter().map(|(_, party)| party.id.as_str()).collect();
        if distinct.len() != parties.len() {
            return Err(WorkflowError::Validation(
                "the three parties must be different employees".to_string(),
            ));
        }

        check_dates(draft.start_date, draft.end_date)?;

        let mut tasks = Vec::with_capacity(draft.tasks.len());
        for (index, task) in draft.tasks.into_iter().enumerate() {
            let description = task.description.trim();
            if description.is_empty() {
                return Err(WorkflowError::Validation(format!(
                    "task {} has an empty description",
                    index + 1
                )));
            }
            let initial_comment = task
                .initial_comment
                .map(|comment| comment.trim().to_string())
                .filter(|comment| !comment.is_empty());
            tasks.push(HandoverTask::new(description, initial_comment));
        }

        let id = HandoverId::new();
        let request_id = draft
            .request_id
            .map(|rid| rid.trim().to_string())
            .filter(|rid| !rid.is_empty())
            .unwrap_or_else(|| default_request_id(id));

        Ok(HandoverRequest {
            id,
            request_id,
            handing_over_employee: draft.handing_over_employee,
            taking_over_employee: draft.taking_over_employee,
            line_manager: draft.line_manager,
            start_date: draft.start_date,
            end_date: draft.end_date,
            workflow: WorkflowState::default(),
            knowledge: draft.knowledge,
            tasks,
            attachments: draft.attachments,
            activity_log: Vec::new(),
            created_at: Utc::now(),
            version: 0,
        })
    }

    pub async fn get_handover(&self, id: HandoverId) -> Result<HandoverRequest, WorkflowError> {
        self.store
            .fetch(id)
            .await?
            .ok_or(WorkflowError::HandoverNotFound(id))
    }

    pub async fn list_handovers(&self) -> Result<Vec<HandoverRequest>, WorkflowError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_activity_log(
        &self,
        id: HandoverId,
    ) -> Result<Vec<HandoverActivityEntry>, WorkflowError> {
        let handover = self.get_handover(id).await?;
        Ok(ActivityLog::entries(&handover))
    }

    pub async fn get_task_activity_log(
        &self,
        task_id: TaskId,
    ) -> Result<Vec<TaskActivityEntry>, WorkflowError> {
        let handover = self.task_owner(task_id).await?;
        TaskTracker::activity_log(&handover, task_id)
    }

    pub async fn get_available_actions(
        &self,
        id: HandoverId,
        actor: &Actor,
    ) -> Result<Vec<AvailableAction>, WorkflowError> {
        let handover = self.get_handover(id).await?;
        Ok(Self::available_actions(&handover, actor))
    }

    /// Actions the guard currently allows `actor`, in lifecycle order.
    pub fn available_actions(handover: &HandoverRequest, actor: &Actor) -> Vec<AvailableAction> {
        HandoverAction::ALL
            .into_iter()
            .filter_map(|action| {
                let decision = AuthorizationGuard::evaluate(actor, handover, action);
                decision.is_allowed().then(|| AvailableAction {
                    action,
                    allowed_reason: decision.reason(),
                    requires_comment: action.requires_comment(),
                })
            })
            .collect()
    }

    /// `apply_transition` with the action given by name, e.g. `"sign_ho"`.
    pub async fn apply_named_transition(
        &self,
        id: HandoverId,
        actor: &Actor,
        action: &str,
        comment: Option<&str>,
    ) -> Result<HandoverRequest, WorkflowError> {
        let action = action.parse::<HandoverAction>().map_err(|err| {
            self.metrics.record_validation_failure();
            WorkflowError::Validation(err.to_string())
        })?;
        self.apply_transition(id, actor, action, comment).await
    }

    pub async fn apply_transition(
        &self,
        id: HandoverId,
        actor: &Actor,
        action: HandoverAction,
        comment: Option<&str>,
    ) -> Result<HandoverRequest, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = create_transition_span(
            "apply_transition",
            Some(&id.to_string()),
            Some(action.as_str()),
            &correlation_id,
        );
        self.transition_locked(id, actor, action, comment)
            .instrument(span)
            .await
    }

    async fn transition_locked(
        &self,
        id: HandoverId,
        actor: &Actor,
        action: HandoverAction,
        comment: Option<&str>,
    ) -> Result<HandoverRequest, WorkflowError> {
        let timer = OperationTimer::new("apply_transition");
        let _lock = self.handover_locks.lock(id).await;
        let handover = self.get_handover(id).await?;

        let role = match AuthorizationGuard::evaluate(actor, &handover, action) {
            GuardDecision::Allowed { role } => role,
            GuardDecision::Denied { reason } => {
                self.metrics.record_denied();
                warn!(
                    actor_id = %actor.employee_id,
                    status = %handover.status(),
                    %reason,
                    "Transition denied"
                );
                return Err(WorkflowError::Authorization {
                    action: action.to_string(),
                    actor: actor.display_name.clone(),
                    reason,
                });
            }
        };

        let comment = validate_comment(action, comment, self.settings.max_comment_length)
            .inspect_err(|_| self.metrics.record_validation_failure())?;

        let now = Utc::now();
        let next = handover.workflow.apply(action, comment.as_deref(), now);
        let entry = ActivityLog::transition_entry(actor, role, action, next.status, comment, now);

        match self
            .store
            .commit_transition(id, handover.version, next, entry)
            .await?
        {
            CommitOutcome::Committed(updated) => {
                self.metrics.record_applied();
                info!(
                    actor_id = %actor.employee_id,
                    role = %role,
                    from = %handover.status(),
                    to = %updated.status(),
                    version = updated.version,
                    "Transition applied"
                );
                timer.finish();
                Ok(updated)
            }
            stale => {
                self.metrics.record_conflict();
                warn!(
                    expected_version = handover.version,
                    outcome = ?stale,
                    "Handover changed underneath the transition"
                );
                Err(WorkflowError::Conflict {
                    handover_id: id,
                    task_id: None,
                })
            }
        }
    }

    pub async fn update_task_status(
        &self,
        task_id: TaskId,
        actor: &Actor,
        new_status: &str,
        comment: Option<&str>,
    ) -> Result<HandoverRequest, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let span = tracing::info_span!(
            "task_update",
            task.id = %task_id,
            correlation.id = %correlation_id
        );
        self.task_update_locked(task_id, actor, new_status, comment)
            .instrument(span)
            .await
    }

    async fn task_update_locked(
        &self,
        task_id: TaskId,
        actor: &Actor,
        new_status: &str,
        comment: Option<&str>,
    ) -> Result<HandoverRequest, WorkflowError> {
        let timer = OperationTimer::new("update_task_status");
        let _lock = self.task_locks.lock(task_id).await;
        let handover = self.task_owner(task_id).await?;

        let update = TaskTracker::plan_update(actor, &handover, task_id, new_status, comment, Utc::now())
            .inspect_err(|err| {
                debug!(actor_id = %actor.employee_id, error = %err, "Task update refused");
                if matches!(err, WorkflowError::Validation(_)) {
                    self.metrics.record_validation_failure();
                }
            })?;
        if let Some(text) = &update.entry.comment {
            if text.chars().count() > self.settings.max_comment_length {
                self.metrics.record_validation_failure();
                return Err(WorkflowError::Validation(format!(
                    "comment exceeds {} characters",
                    self.settings.max_comment_length
                )));
            }
        }

        let (old_status, target) = (update.entry.old_status, update.new_status);
        match self.store.commit_task(update).await? {
            CommitOutcome::Committed(updated) => {
                self.metrics.record_task_update();
                info!(
                    handover_id = %updated.id,
                    actor_id = %actor.employee_id,
                    from = %old_status,
                    to = %target,
                    "Task status changed"
                );
                timer.finish();
                Ok(updated)
            }
            stale => {
                self.metrics.record_conflict();
                warn!(
                    actor_id = %actor.employee_id,
                    outcome = ?stale,
                    "Task changed underneath the update"
                );
                Err(WorkflowError::Conflict {
                    handover_id: handover.id,
                    task_id: Some(task_id),
                })
            }
        }
    }

    async fn task_owner(&self, task_id: TaskId) -> Result<HandoverRequest, WorkflowError> {
        let owner = self
            .store
            .find_task_owner(task_id)
            .await?
            .ok_or(WorkflowError::TaskNotFound(task_id))?;
        self.get_handover(owner).await
    }
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), WorkflowError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(WorkflowError::Validation(format!(
            "start date {start} is after end date {end}"
        ))),
        _ => Ok(()),
    }
}

/// `HO-` followed by the first eight hex digits of the id.
fn default_request_id(id: HandoverId) -> String {
    let simple = id.0.simple().to_string().to_uppercase();
    format!("HO-{}", &simple[..8])
}
