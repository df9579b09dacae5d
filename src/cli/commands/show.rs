use anyhow::Result;

use super::CommandContext;
use crate::handover::{HandoverId, HandoverRequest};

pub struct ShowCommand {
    pub id: HandoverId,
}

impl ShowCommand {
    pub fn new(id: HandoverId) -> Self {
        Self { id }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let handover = ctx.engine.get_handover(self.id).await?;
        ctx.emit(&handover, || print_handover(&handover))
    }
}

pub fn print_handover(handover: &HandoverRequest) {
    println!("📄 HANDOVER {} ({})", handover.request_id, handover.id);
    println!("   Status:        {}", handover.status());
    println!(
        "   Handing over:  {} [{}]",
        handover.handing_over_employee.name, handover.handing_over_employee.id
    );
    println!(
        "   Taking over:   {} [{}]",
        handover.taking_over_employee.name, handover.taking_over_employee.id
    );
    println!(
        "   Line manager:  {} [{}]",
        handover.line_manager.name, handover.line_manager.id
    );
    if let (Some(start), Some(end)) = (handover.start_date, handover.end_date) {
        println!("   Period:        {start} .. {end}");
    }

    let milestones: Vec<String> = handover
        .workflow
        .milestones()
        .iter()
        .map(|(name, reached)| format!("{name}={}", if *reached { "yes" } else { "no" }))
        .collect();
    println!("   Milestones:    {}", milestones.join(" "));
    if let Some(reason) = &handover.workflow.rejection_reason {
        println!("   Rejected:      {reason}");
    }
    if let Some(question) = &handover.workflow.lm_clarification_comment {
        println!("   Clarification: {question}");
    }

    if !handover.tasks.is_empty() {
        println!();
        println!("📋 TASKS:");
        for task in &handover.tasks {
            println!("   {}  {:<12} {}", task.id, task.current_status, task.description);
        }
        let summary: Vec<String> = handover
            .task_summary()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(status, count)| format!("{status}={count}"))
            .collect();
        println!("   Summary: {}", summary.join(" "));
    }
}
