use anyhow::Result;

use super::CommandContext;
use crate::handover::HandoverId;

pub struct ApplyCommand {
    pub id: HandoverId,
    pub action: String,
    pub comment: Option<String>,
}

impl ApplyCommand {
    pub fn new(id: HandoverId, action: String, comment: Option<String>) -> Self {
        Self {
            id,
            action,
            comment,
        }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor()?;
        let updated = ctx
            .engine
            .apply_named_transition(self.id, actor, &self.action, self.comment.as_deref())
            .await?;
        ctx.emit(&updated, || {
            println!(
                "✅ {} applied, {} is now {}",
                self.action,
                updated.request_id,
                updated.status()
            );
        })
    }
}
