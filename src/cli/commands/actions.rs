use anyhow::Result;

use super::CommandContext;
use crate::handover::HandoverId;

pub struct ActionsCommand {
    pub id: HandoverId,
}

impl ActionsCommand {
    pub fn new(id: HandoverId) -> Self {
        Self { id }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor()?;
        let actions = ctx.engine.get_available_actions(self.id, actor).await?;
        ctx.emit(&actions, || {
            if actions.is_empty() {
                println!("No actions available to {}", actor.display_name);
                return;
            }
            for available in &actions {
                let note = if available.requires_comment {
                    " (comment required)"
                } else {
                    ""
                };
                println!(
                    "{:<10} {}{note}",
                    available.action.as_str(),
                    available.allowed_reason
                );
            }
        })
    }
}
