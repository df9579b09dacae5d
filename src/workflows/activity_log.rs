// Append-only activity trail
//
// Handover-level entries are produced by the engine, one per committed
// transition. Task entries live on each task and are never merged into the
// handover log.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::handover::{
    Actor, HandoverAction, HandoverActivityEntry, HandoverRequest, HandoverStatus, Role,
    TaskActivityEntry, TaskStatus,
};

pub const TASK_STATUS_CHANGE: &str = "status_change";

pub struct ActivityLog;

impl ActivityLog {
    pub fn transition_entry(
        actor: &Actor,
        role: Role,
        action: HandoverAction,
        status: HandoverStatus,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> HandoverActivityEntry {
        HandoverActivityEntry {
            actor_id: actor.employee_id.clone(),
            actor_name: actor.display_name.clone(),
            acted_as: role,
            action,
            status,
            comment,
            timestamp: at,
        }
    }

    pub fn task_entry(
        actor: &Actor,
        old_status: TaskStatus,
        new_status: TaskStatus,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) -> TaskActivityEntry {
        TaskActivityEntry {
            actor: actor.display_name.clone(),
            action: TASK_STATUS_CHANGE.to_string(),
            old_status,
            new_status,
            comment,
            timestamp: at,
        }
    }

    /// Entries in append order, oldest first.
    pub fn entries(handover: &HandoverRequest) -> Vec<HandoverActivityEntry> {
        handover.activity_log.clone()
    }
}

impl fmt::Display for HandoverActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {} -> {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.actor_name,
            self.acted_as,
            self.action,
            self.status
        )?;
        if let Some(comment) = &self.comment {
            write!(f, ": {comment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TaskActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} -> {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.actor,
            self.action,
            self.old_status,
            self.new_status
        )?;
        if let Some(comment) = &self.comment {
            write!(f, ": {comment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transition_entry_rendering() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let actor = Actor::employee("lm", "Lena");
        let entry = ActivityLog::transition_entry(
            &actor,
            Role::LineManager,
            HandoverAction::Clarify,
            HandoverStatus::NeedClarification,
            Some("need more detail on access list".to_string()),
            at,
        );
        assert_eq!(
            entry.to_string(),
            "2026-03-02 09:30:00 Lena (line_manager) clarify -> NEED_CLARIFICATION: need more detail on access list"
        );
    }

    #[test]
    fn test_task_entry_uses_status_change_action() {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let entry = ActivityLog::task_entry(
            &Actor::employee("to", "Tomas"),
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            None,
            at,
        );
        assert_eq!(entry.action, "status_change");
        assert_eq!(
            entry.to_string(),
            "2026-03-02 09:30:00 Tomas status_change NOT_STARTED -> IN_PROGRESS"
        );
    }
}
