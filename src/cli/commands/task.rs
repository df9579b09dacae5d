use anyhow::Result;

use super::CommandContext;
use crate::handover::TaskId;

pub struct TaskCommand {
    pub task_id: TaskId,
    pub status: String,
    pub comment: Option<String>,
}

impl TaskCommand {
    pub fn new(task_id: TaskId, status: String, comment: Option<String>) -> Self {
        Self {
            task_id,
            status,
            comment,
        }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor()?;
        let updated = ctx
            .engine
            .update_task_status(self.task_id, actor, &self.status, self.comment.as_deref())
            .await?;
        ctx.emit(&updated, || {
            if let Some(task) = updated.task(self.task_id) {
                println!("✅ Task '{}' is now {}", task.description, task.current_status);
            }
        })
    }
}
