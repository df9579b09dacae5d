// Handover Desk Library - sign-off workflow for responsibility handovers
// This exposes the engine, its stores and the CLI for testing and embedding

pub mod cli;
pub mod config;
pub mod handover;
pub mod observability;
pub mod store;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, HandoverConfig};
pub use handover::{
    Actor, EmployeeRef, HandoverAction, HandoverDraft, HandoverId, HandoverRequest,
    HandoverStatus, TaskId, TaskStatus,
};
pub use observability::{OperationTimer, WorkflowMetrics};
pub use store::{FileHandoverStore, HandoverStore, InMemoryHandoverStore, StoreError};
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use workflows::{
    AuthorizationGuard, AvailableAction, ErrorKind, HandoverWorkflowEngine, WorkflowError,
};
