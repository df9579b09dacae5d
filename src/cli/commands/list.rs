use anyhow::Result;

use super::CommandContext;

pub struct ListCommand;

impl ListCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let handovers = ctx.engine.list_handovers().await?;
        ctx.emit(&handovers, || {
            if handovers.is_empty() {
                println!("📋 No handovers yet");
                return;
            }
            for handover in &handovers {
                println!(
                    "{}  {:<12} {:<26} {} -> {}",
                    handover.id,
                    handover.request_id,
                    handover.status(),
                    handover.handing_over_employee.name,
                    handover.taking_over_employee.name
                );
            }
        })
    }
}
