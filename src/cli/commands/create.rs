use anyhow::{Context, Result};
use std::path::PathBuf;

use super::CommandContext;
use crate::handover::HandoverDraft;

pub struct CreateCommand {
    pub file: PathBuf,
}

impl CreateCommand {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let actor = ctx.actor()?;
        let raw = tokio::fs::read_to_string(&self.file)
            .await
            .with_context(|| format!("reading draft {}", self.file.display()))?;
        let draft: HandoverDraft = serde_json::from_str(&raw)
            .with_context(|| format!("parsing draft {}", self.file.display()))?;

        let handover = ctx.engine.create_handover(draft, actor).await?;
        ctx.emit(&handover, || {
            println!("✅ Created handover {} ({})", handover.request_id, handover.id);
            for task in &handover.tasks {
                println!("   📋 {}  {}", task.id, task.description);
            }
        })
    }
}
