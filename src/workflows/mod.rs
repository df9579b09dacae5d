// Handover workflow: guard, state machine, task tracking and the engine
// that ties them to a store

pub mod activity_log;
pub mod engine;
pub mod errors;
pub mod guard;
pub mod locks;
pub mod state_machine;
pub mod tasks;


pub use activity_log::{ActivityLog, TASK_STATUS_CHANGE};
pub use engine::{AvailableAction, HandoverWorkflowEngine};
pub use errors::{ErrorKind, WorkflowError};
pub use guard::{AuthorizationGuard, DenialReason, GuardDecision};
pub use locks::KeyedLocks;
pub use state_machine::validate_comment;
pub use tasks::{TaskTracker, TaskUpdate, UPDATE_TASK_STATUS};
