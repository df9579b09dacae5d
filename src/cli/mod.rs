use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, StoreBackend, StoreConfig};
use crate::handover::{Actor, HandoverId, TaskId};
use crate::store::{FileHandoverStore, HandoverStore};
use crate::telemetry::init_telemetry;
use crate::workflows::HandoverWorkflowEngine;

pub mod commands;

use commands::{
    actions::ActionsCommand, apply::ApplyCommand, config::ConfigCommand, create::CreateCommand,
    list::ListCommand, log::LogCommand, show::ShowCommand, task::TaskCommand, CommandContext,
};

#[derive(Parser)]
#[command(name = "handover")]
#[command(about = "Sign-off workflow for responsibility handovers")]
#[command(long_about = "Drives handovers between a handing-over employee, a taking-over employee \
                       and their line manager through signing, approval and takeover. Start with \
                       'handover create --file draft.json'.")]
pub struct Cli {
    /// Directory of the file store (overrides configuration)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub actor: ActorArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Who is invoking the command
#[derive(Args, Debug, Clone, Default)]
pub struct ActorArgs {
    /// Employee id of the acting user
    #[arg(long = "actor", global = true)]
    pub employee_id: Option<String>,

    /// Display name recorded in activity logs (defaults to the employee id)
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Act with administrator rights
    #[arg(long, global = true)]
    pub admin: bool,
}

impl ActorArgs {
    pub fn to_actor(&self) -> Option<Actor> {
        let id = self.employee_id.as_deref()?.trim();
        if id.is_empty() {
            return None;
        }
        let name = self.name.clone().unwrap_or_else(|| id.to_string());
        Some(if self.admin {
            Actor::admin(id, name)
        } else {
            Actor::employee(id, name)
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a handover from a JSON draft
    Create {
        /// Path of the draft file
        #[arg(long)]
        file: PathBuf,
    },
    /// List all handovers
    List,
    /// Show one handover with its tasks
    Show { id: HandoverId },
    /// Show the activity log of a handover
    Log { id: HandoverId },
    /// Show the activity log of a task
    TaskLog { task_id: TaskId },
    /// List the actions the actor may take on a handover
    Actions { id: HandoverId },
    /// Apply a workflow action (sign_ho, sign_to, approve, reject, clarify, resubmit, takeover, takeback)
    Apply {
        id: HandoverId,
        action: String,
        #[arg(long, short = 'm')]
        comment: Option<String>,
    },
    /// Change a task's status (NOT_STARTED, IN_PROGRESS, COMPLETED, CANCELED, POSTPONED)
    Task {
        task_id: TaskId,
        status: String,
        #[arg(long, short = 'm')]
        comment: Option<String>,
    },
    /// Print the effective configuration
    Config {
        /// Write it as TOML to this path instead
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

/// Each CLI run is a fresh process, so only the file backend persists.
pub async fn open_store(settings: &StoreConfig) -> Result<Arc<dyn HandoverStore>> {
    match settings.backend {
        StoreBackend::File => Ok(Arc::new(
            FileHandoverStore::open(&settings.directory)
                .await
                .with_context(|| format!("opening store at {}", settings.directory.display()))?,
        )),
        StoreBackend::Memory => bail!(
            "the memory store backend is library-only, set store.backend = \"file\" or pass --store"
        ),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = config::config()?.clone();
    if let Some(directory) = cli.store {
        settings.store.backend = StoreBackend::File;
        settings.store.directory = directory;
    }
    init_telemetry(&settings.observability)?;

    if let Commands::Config { write } = cli.command {
        return ConfigCommand::new(settings, write).with_json(cli.json).execute();
    }

    let engine = HandoverWorkflowEngine::new(open_store(&settings.store).await?)
        .with_settings(settings.workflow.clone());
    let ctx = CommandContext::new(engine, cli.actor.to_actor(), cli.json);

    let result = match cli.command {
        Commands::Create { file } => CreateCommand::new(file).execute(&ctx).await,
        Commands::List => ListCommand.execute(&ctx).await,
        Commands::Show { id } => ShowCommand::new(id).execute(&ctx).await,
        Commands::Log { id } => LogCommand::handover(id).execute(&ctx).await,
        Commands::TaskLog { task_id } => LogCommand::task(task_id).execute(&ctx).await,
        Commands::Actions { id } => ActionsCommand::new(id).execute(&ctx).await,
        Commands::Apply {
            id,
            action,
            comment,
        } => ApplyCommand::new(id, action, comment).execute(&ctx).await,
        Commands::Task {
            task_id,
            status,
            comment,
        } => TaskCommand::new(task_id, status, comment).execute(&ctx).await,
        Commands::Config { .. } => Ok(()),
    };

    if settings.observability.metrics_enabled {
        ctx.engine.metrics().log_stats();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply_with_actor() {
        let id = HandoverId::new();
        let cli = Cli::try_parse_from([
            "handover",
            "apply",
            &id.to_string(),
            "reject",
            "--comment",
            "missing access list",
            "--actor",
            "lm-1",
            "--name",
            "Lena",
        ])
        .unwrap();

        let actor = cli.actor.to_actor().unwrap();
        assert_eq!(actor.display_name, "Lena");
        assert!(!actor.is_admin);
        match cli.command {
            Commands::Apply {
                id: parsed,
                action,
                comment,
            } => {
                assert_eq!(parsed, id);
                assert_eq!(action, "reject");
                assert_eq!(comment.as_deref(), Some("missing access list"));
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_name_defaults_to_employee_id() {
        let cli = Cli::try_parse_from(["handover", "--actor", "adm", "--admin", "list"]).unwrap();
        let actor = cli.actor.to_actor().unwrap();
        assert_eq!(actor.display_name, "adm");
        assert!(actor.is_admin);
    }

    #[test]
    fn test_bad_handover_id_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["handover", "show", "not-a-uuid"]).is_err());
    }

    #[tokio::test]
    async fn test_memory_backend_is_refused() {
        let settings = StoreConfig {
            backend: StoreBackend::Memory,
            directory: PathBuf::from("unused"),
        };
        let err = open_store(&settings).await.err().unwrap();
        assert!(err.to_string().contains("library-only"));
    }

    #[tokio::test]
    async fn test_file_backend_opens_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StoreConfig {
            backend: StoreBackend::File,
            directory: dir.path().join("records"),
        };
        assert!(open_store(&settings).await.is_ok());
        assert!(dir.path().join("records").is_dir());
    }
}
