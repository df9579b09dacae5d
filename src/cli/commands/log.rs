use anyhow::Result;

use super::CommandContext;
use crate::handover::{HandoverId, TaskId};

/// Prints a handover's or a task's activity log
pub enum LogCommand {
    Handover(HandoverId),
    Task(TaskId),
}

impl LogCommand {
    pub fn handover(id: HandoverId) -> Self {
        Self::Handover(id)
    }

    pub fn task(task_id: TaskId) -> Self {
        Self::Task(task_id)
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            LogCommand::Handover(id) => {
                let entries = ctx.engine.get_activity_log(*id).await?;
                ctx.emit(&entries, || {
                    if entries.is_empty() {
                        println!("No activity yet");
                    }
                    entries.iter().for_each(|entry| println!("{entry}"));
                })
            }
            LogCommand::Task(task_id) => {
                let entries = ctx.engine.get_task_activity_log(*task_id).await?;
                ctx.emit(&entries, || {
                    if entries.is_empty() {
                        println!("No activity yet");
                    }
                    entries.iter().for_each(|entry| println!("{entry}"));
                })
            }
        }
    }
}
