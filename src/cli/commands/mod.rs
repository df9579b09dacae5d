use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::handover::Actor;
use crate::workflows::HandoverWorkflowEngine;

pub mod actions;
pub mod apply;
pub mod config;
pub mod create;
pub mod list;
pub mod log;
pub mod show;
pub mod task;

/// Everything a command needs to run against the engine
pub struct CommandContext {
    pub engine: HandoverWorkflowEngine,
    pub actor: Option<Actor>,
    pub json: bool,
}

impl CommandContext {
    pub fn new(engine: HandoverWorkflowEngine, actor: Option<Actor>, json: bool) -> Self {
        Self {
            engine,
            actor,
            json,
        }
    }

    pub fn actor(&self) -> Result<&Actor> {
        self.actor
            .as_ref()
            .ok_or_else(|| anyhow!("this command needs an acting user, pass --actor <employee-id>"))
    }

    /// Print `value` as JSON in `--json` mode, otherwise run `human`.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}
