// Handover domain model: the records the workflow engine owns

pub mod status;
pub mod types;

pub use status::{HandoverAction, HandoverStatus, ParseEnumError, Role, TaskStatus};
pub use types::{
    Actor, AttachmentRef, EmployeeId, EmployeeRef, HandoverActivityEntry, HandoverDraft,
    HandoverId, HandoverRequest, HandoverTask, ImportantDate, KnowledgeTransfer, TaskActivityEntry,
    TaskDraft, TaskId, WorkflowState,
};
