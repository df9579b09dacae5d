// Transition effects of the handover state machine
//
// Guards live in `guard.rs`; this module only knows what a permitted action
// does to the workflow fields. Status and milestone flags change together here
// and nowhere else.

use chrono::{DateTime, Utc};

use super::errors::WorkflowError;
use crate::handover::{HandoverAction, WorkflowState};

impl WorkflowState {
    /// Returns the state after `action`. Milestone flags are only ever set,
    /// never cleared.
    pub fn apply(
        &self,
        action: HandoverAction,
        comment: Option<&str>,
        at: DateTime<Utc>,
    ) -> WorkflowState {
        let mut next = self.clone();
        next.status = action.target_status();
        let comment = comment.map(str::to_string);

        match action {
            HandoverAction::SignHo => {
                next.ho_signed = true;
                next.ho_signed_date = Some(at);
            }
            HandoverAction::SignTo => {
                next.to_signed = true;
                next.to_signed_date = Some(at);
            }
            HandoverAction::Approve => {
                next.lm_approved = true;
                next.lm_approved_date = Some(at);
                next.lm_comment = comment;
            }
            HandoverAction::Reject => {
                next.rejection_reason = comment;
                next.rejected_at = Some(at);
            }
            HandoverAction::Clarify => {
                next.lm_clarification_comment = comment;
            }
            HandoverAction::Resubmit => {
                next.resubmission_comment = comment;
            }
            HandoverAction::Takeover => {
                next.taken_over = true;
                next.taken_over_date = Some(at);
            }
            HandoverAction::Takeback => {
                next.taken_back = true;
                next.taken_back_date = Some(at);
            }
        }

        next
    }

    /// Milestones reached so far, in lifecycle order.
    pub fn milestones(&self) -> [(&'static str, bool); 5] {
        [
            ("ho_signed", self.ho_signed),
            ("to_signed", self.to_signed),
            ("lm_approved", self.lm_approved),
            ("taken_over", self.taken_over),
            ("taken_back", self.taken_back),
        ]
    }
}

/// Trims the comment and enforces the per-action requirements.
///
/// `reject`, `clarify` and `resubmit` need a non-blank comment; any comment
/// longer than `max_length` characters is refused.
pub fn validate_comment(
    action: HandoverAction,
    comment: Option<&str>,
    max_length: usize,
) -> Result<Option<String>, WorkflowError> {
    let trimmed = comment.map(str::trim).filter(|text| !text.is_empty());

    match trimmed {
        None if action.requires_comment() => Err(WorkflowError::Validation(format!(
            "'{action}' requires a non-empty comment"
        ))),
        Some(text) if text.chars().count() > max_length => Err(WorkflowError::Validation(
            format!("comment exceeds {max_length} characters"),
        )),
        other => Ok(other.map(str::to_string)),
    }
}
