// Core records of a responsibility handover

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::status::{HandoverAction, HandoverStatus, Role, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandoverId(pub Uuid);

impl HandoverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandoverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandoverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for HandoverId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Employee identifier as issued by the HR directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EmployeeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub id: EmployeeId,
    pub name: String,
}

impl EmployeeRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: EmployeeId::new(id),
            name: name.into(),
        }
    }
}

/// The authenticated principal invoking an operation.
///
/// Identity and the administrator flag come from the (external) session layer;
/// the engine trusts them as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub employee_id: EmployeeId,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Actor {
    pub fn employee(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            employee_id: EmployeeId::new(id),
            display_name: display_name.into(),
            is_admin: false,
        }
    }

    pub fn admin(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::employee(id, display_name)
        }
    }

    pub fn from_employee(employee: &EmployeeRef) -> Self {
        Self::employee(employee.id.as_str(), employee.name.as_str())
    }

    pub fn is(&self, employee: &EmployeeRef) -> bool {
        self.employee_id == employee.id
    }
}

/// State-machine fields of a handover.
///
/// Status and milestone flags are only ever changed together, by
/// `WorkflowState::apply` in the workflows module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub status: HandoverStatus,
    pub ho_signed: bool,
    pub ho_signed_date: Option<DateTime<Utc>>,
    pub to_signed: bool,
    pub to_signed_date: Option<DateTime<Utc>>,
    pub lm_approved: bool,
    pub lm_approved_date: Option<DateTime<Utc>>,
    pub lm_comment: Option<String>,
    pub lm_clarification_comment: Option<String>,
    pub resubmission_comment: Option<String>,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub taken_over: bool,
    pub taken_over_date: Option<DateTime<Utc>>,
    pub taken_back: bool,
    pub taken_back_date: Option<DateTime<Utc>>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            status: HandoverStatus::Created,
            ho_signed: false,
            ho_signed_date: None,
            to_signed: false,
            to_signed_date: None,
            lm_approved: false,
            lm_approved_date: None,
            lm_comment: None,
            lm_clarification_comment: None,
            resubmission_comment: None,
            rejection_reason: None,
            rejected_at: None,
            taken_over: false,
            taken_over_date: None,
            taken_back: false,
            taken_back_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantDate {
    pub date: NaiveDate,
    pub description: String,
}

/// Reference to a file held by the attachment storage service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskActivityEntry {
    pub actor: String,
    pub action: String,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverTask {
    pub id: TaskId,
    pub description: String,
    pub current_status: TaskStatus,
    #[serde(default)]
    pub initial_comment: Option<String>,
    #[serde(default)]
    pub activity_log: Vec<TaskActivityEntry>,
    #[serde(default)]
    pub version: u64,
}

impl HandoverTask {
    pub fn new(description: impl Into<String>, initial_comment: Option<String>) -> Self {
        Self {
            id: TaskId::new(),
            description: description.into(),
            current_status: TaskStatus::NotStarted,
            initial_comment,
            activity_log: Vec::new(),
            version: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverActivityEntry {
    pub actor_id: EmployeeId,
    pub actor_name: String,
    pub acted_as: Role,
    pub action: HandoverAction,
    /// Status after the transition
    pub status: HandoverStatus,
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Free-text knowledge transfer captured on the handover form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeTransfer {
    #[serde(default)]
    pub contacts: String,
    #[serde(default)]
    pub access_info: String,
    #[serde(default)]
    pub documents_info: String,
    #[serde(default)]
    pub open_issues: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub important_dates: Vec<ImportantDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequest {
    pub id: HandoverId,
    pub request_id: String,
    pub handing_over_employee: EmployeeRef,
    pub taking_over_employee: EmployeeRef,
    pub line_manager: EmployeeRef,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub workflow: WorkflowState,
    #[serde(flatten)]
    pub knowledge: KnowledgeTransfer,
    #[serde(default)]
    pub tasks: Vec<HandoverTask>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub activity_log: Vec<HandoverActivityEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl HandoverRequest {
    pub fn status(&self) -> HandoverStatus {
        self.workflow.status
    }

    pub fn task(&self, task_id: TaskId) -> Option<&HandoverTask> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Number of tasks in each status, every status present.
    pub fn task_summary(&self) -> BTreeMap<TaskStatus, usize> {
        let mut summary: BTreeMap<TaskStatus, usize> =
            TaskStatus::ALL.into_iter().map(|status| (status, 0)).collect();
        for task in &self.tasks {
            *summary.entry(task.current_status).or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub description: String,
    #[serde(default)]
    pub initial_comment: Option<String>,
}

/// Input of the creation flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverDraft {
    #[serde(default)]
    pub request_id: Option<String>,
    pub handing_over_employee: EmployeeRef,
    pub taking_over_employee: EmployeeRef,
    pub line_manager: EmployeeRef,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub knowledge: KnowledgeTransfer,
    #[serde(default)]
    pub tasks: Vec<TaskDraft>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl HandoverDraft {
    pub fn new(
        handing_over_employee: EmployeeRef,
        taking_over_employee: EmployeeRef,
        line_manager: EmployeeRef,
    ) -> Self {
        Self {
            request_id: None,
            handing_over_employee,
            taking_over_employee,
            line_manager,
            start_date: None,
            end_date: None,
            knowledge: KnowledgeTransfer::default(),
            tasks: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_task(mut self, description: impl Into<String>) -> Self {
        self.tasks.push(TaskDraft {
            description: description.into(),
            initial_comment: None,
        });
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> HandoverRequest {
        HandoverRequest {
            id: HandoverId::new(),
            request_id: "HO-TEST".to_string(),
            handing_over_employee: EmployeeRef::new("e-1", "Ana"),
            taking_over_employee: EmployeeRef::new("e-2", "Bo"),
            line_manager: EmployeeRef::new("e-3", "Cy"),
            start_date: None,
            end_date: None,
            workflow: WorkflowState::default(),
            knowledge: KnowledgeTransfer::default(),
            tasks: vec![HandoverTask::new("Rotate keys", None), HandoverTask::new("Docs", None)],
            attachments: Vec::new(),
            activity_log: Vec::new(),
            created_at: Utc::now(),
            version: 0,
        }
    }

    #[test]
    fn test_persisted_layout_is_flat() {
        let request = sample_request();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["status"], "CREATED");
        assert_eq!(value["ho_signed"], false);
        assert_eq!(value["lm_clarification_comment"], serde_json::Value::Null);
        assert!(value.get("workflow").is_none());

        let back: HandoverRequest = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_task_summary_counts_every_status() {
        let mut request = sample_request();
        request.tasks[1].current_status = TaskStatus::Completed;
        let summary = request.task_summary();
        assert_eq!(summary.len(), 5);
        assert_eq!(summary[&TaskStatus::NotStarted], 1);
        assert_eq!(summary[&TaskStatus::Completed], 1);
        assert_eq!(summary[&TaskStatus::Canceled], 0);
    }

    #[test]
    fn test_actor_identity_matching() {
        let request = sample_request();
        let actor = Actor::from_employee(&request.taking_over_employee);
        assert!(actor.is(&request.taking_over_employee));
        assert!(!actor.is(&request.line_manager));
        assert!(!actor.is_admin);
        assert!(Actor::admin("root", "Admin").is_admin);
    }
}
