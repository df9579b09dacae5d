// Enumerations for handover and task lifecycles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status of a handover request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandoverStatus {
    /// Record exists, nobody has signed yet
    Created,
    SignedByHandingOver,
    SignedByTakingOver,
    /// Line manager asked the handing-over party for more detail
    NeedClarification,
    /// Handing-over party answered a clarification request
    Resubmitted,
    ApprovedByLineManager,
    /// Terminal
    Rejected,
    TakenOver,
    /// Terminal
    TakenBack,
}

impl HandoverStatus {
    pub const ALL: [HandoverStatus; 9] = [
        HandoverStatus::Created,
        HandoverStatus::SignedByHandingOver,
        HandoverStatus::SignedByTakingOver,
        HandoverStatus::NeedClarification,
        HandoverStatus::Resubmitted,
        HandoverStatus::ApprovedByLineManager,
        HandoverStatus::Rejected,
        HandoverStatus::TakenOver,
        HandoverStatus::TakenBack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandoverStatus::Created => "CREATED",
            HandoverStatus::SignedByHandingOver => "SIGNED_BY_HANDING_OVER",
            HandoverStatus::SignedByTakingOver => "SIGNED_BY_TAKING_OVER",
            HandoverStatus::NeedClarification => "NEED_CLARIFICATION",
            HandoverStatus::Resubmitted => "RESUBMITTED",
            HandoverStatus::ApprovedByLineManager => "APPROVED_BY_LINE_MANAGER",
            HandoverStatus::Rejected => "REJECTED",
            HandoverStatus::TakenOver => "TAKEN_OVER",
            HandoverStatus::TakenBack => "TAKEN_BACK",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandoverStatus::Rejected | HandoverStatus::TakenBack)
    }

    /// Statuses in which the line manager may decide (approve, reject, clarify).
    pub fn awaits_line_manager(&self) -> bool {
        matches!(
            self,
            HandoverStatus::SignedByTakingOver | HandoverStatus::Resubmitted
        )
    }
}

impl fmt::Display for HandoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single handover task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Canceled,
    Postponed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Canceled,
        TaskStatus::Postponed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NOT_STARTED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Canceled => "CANCELED",
            TaskStatus::Postponed => "POSTPONED",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::NotStarted
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the exact wire names are accepted.
impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("task status", s))
    }
}

/// Actions a caller may request against a handover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverAction {
    SignHo,
    SignTo,
    Approve,
    Reject,
    Clarify,
    Resubmit,
    Takeover,
    Takeback,
}

impl HandoverAction {
    pub const ALL: [HandoverAction; 8] = [
        HandoverAction::SignHo,
        HandoverAction::SignTo,
        HandoverAction::Approve,
        HandoverAction::Reject,
        HandoverAction::Clarify,
        HandoverAction::Resubmit,
        HandoverAction::Takeover,
        HandoverAction::Takeback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandoverAction::SignHo => "sign_ho",
            HandoverAction::SignTo => "sign_to",
            HandoverAction::Approve => "approve",
            HandoverAction::Reject => "reject",
            HandoverAction::Clarify => "clarify",
            HandoverAction::Resubmit => "resubmit",
            HandoverAction::Takeover => "takeover",
            HandoverAction::Takeback => "takeback",
        }
    }

    pub fn requires_comment(&self) -> bool {
        matches!(
            self,
            HandoverAction::Reject | HandoverAction::Clarify | HandoverAction::Resubmit
        )
    }

    /// Status the handover lands in after this action succeeds.
    pub fn target_status(&self) -> HandoverStatus {
        match self {
            HandoverAction::SignHo => HandoverStatus::SignedByHandingOver,
            HandoverAction::SignTo => HandoverStatus::SignedByTakingOver,
            HandoverAction::Approve => HandoverStatus::ApprovedByLineManager,
            HandoverAction::Reject => HandoverStatus::Rejected,
            HandoverAction::Clarify => HandoverStatus::NeedClarification,
            HandoverAction::Resubmit => HandoverStatus::Resubmitted,
            HandoverAction::Takeover => HandoverStatus::TakenOver,
            HandoverAction::Takeback => HandoverStatus::TakenBack,
        }
    }
}

impl fmt::Display for HandoverAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoverAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| ParseEnumError::new("handover action", s))
    }
}

/// Role an actor plays relative to one handover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    HandingOver,
    TakingOver,
    LineManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::HandingOver => "handing_over",
            Role::TakingOver => "taking_over",
            Role::LineManager => "line_manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
