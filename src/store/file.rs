// JSON file store: one `<id>.json` file per handover in a directory
//
// Writers take an exclusive `fd-lock` on `.store.lock` for the whole
// read-check-write cycle, so several processes can share a directory. Files
// are written to a temp path and renamed, readers never see a half-written
// record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::traits::{
    apply_task_commit, apply_transition_commit, CommitOutcome, HandoverStore, StoreError,
};
use crate::handover::{HandoverActivityEntry, HandoverId, HandoverRequest, TaskId, WorkflowState};
use crate::workflows::TaskUpdate;

pub const STORE_FORMAT_VERSION: u32 = 1;
const LOCK_FILE: &str = ".store.lock";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterInfo {
    pub hostname: String,
    pub pid: u32,
}

impl WriterInfo {
    fn current() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            pid: std::process::id(),
        }
    }
}

/// On-disk envelope around a handover record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredHandover {
    pub format_version: u32,
    pub written_at: DateTime<Utc>,
    pub written_by: WriterInfo,
    pub handover: HandoverRequest,
}

impl StoredHandover {
    fn wrap(handover: HandoverRequest) -> Self {
        Self {
            format_version: STORE_FORMAT_VERSION,
            written_at: Utc::now(),
            written_by: WriterInfo::current(),
            handover,
        }
    }

    fn unwrap_checked(self) -> Result<HandoverRequest, StoreError> {
        if self.format_version != STORE_FORMAT_VERSION {
            return Err(StoreError::UnsupportedFormat {
                found: self.format_version,
                expected: STORE_FORMAT_VERSION,
            });
        }
        Ok(self.handover)
    }
}

#[derive(Debug, Clone)]
pub struct FileHandoverStore {
    directory: PathBuf,
}

impl FileHandoverStore {
    /// Open (creating if needed) a store directory.
    pub async fn open(directory: impl AsRef<Path>) -> Result<Self, StoreError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).await?;
        info!(directory = ?directory, "Opened handover file store");
        Ok(Self { directory })
    }

    fn record_path(directory: &Path, id: HandoverId) -> PathBuf {
        directory.join(format!("{id}.json"))
    }

    async fn read_record(path: &Path) -> Result<HandoverRequest, StoreError> {
        let contents = fs::read_to_string(path).await?;
        let stored: StoredHandover = serde_json::from_str(&contents)?;
        stored.unwrap_checked()
    }

    /// Run `mutate` on the current record while holding the directory lock.
    async fn locked_update<F>(&self, id: HandoverId, mutate: F) -> Result<CommitOutcome, StoreError>
    where
        F: FnOnce(Option<HandoverRequest>) -> Result<Mutation, StoreError> + Send + 'static,
    {
        let directory = self.directory.clone();
        tokio::task::spawn_blocking(move || {
            let lock_file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(directory.join(LOCK_FILE))?;
            let mut lock = fd_lock::RwLock::new(lock_file);
            let _guard = lock.write()?;

            let path = Self::record_path(&directory, id);
            let current = match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    let stored: StoredHandover = serde_json::from_str(&contents)?;
                    Some(stored.unwrap_checked()?)
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => return Err(err.into()),
            };

            match mutate(current)? {
                Mutation::Write(record, outcome) => {
                    let serialized = serde_json::to_string_pretty(&StoredHandover::wrap(record))?;
                    let temp = path.with_extension("json.tmp");
                    std::fs::write(&temp, serialized)?;
                    std::fs::rename(&temp, &path)?;
                    debug!(handover_id = %id, file = ?path, "Handover file written");
                    Ok(outcome)
                }
                Mutation::Skip(outcome) => Ok(outcome),
            }
        })
        .await
        .map_err(|err| StoreError::WorkerFailed(err.to_string()))?
    }
}

enum Mutation {
    Write(HandoverRequest, CommitOutcome),
    Skip(CommitOutcome),
}

impl Mutation {
    fn from_outcome(outcome: CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::Committed(record) => {
                Mutation::Write(record.clone(), CommitOutcome::Committed(record))
            }
            mismatch => Mutation::Skip(mismatch),
        }
    }
}

#[async_trait]
impl HandoverStore for FileHandoverStore {
    async fn insert(&self, handover: HandoverRequest) -> Result<(), StoreError> {
        let id = handover.id;
        self.locked_update(id, move |current| {
            if current.is_some() {
                return Err(StoreError::Duplicate(id));
            }
            let outcome = CommitOutcome::Committed(handover.clone());
            Ok(Mutation::Write(handover, outcome))
        })
        .await?;
        Ok(())
    }

    async fn fetch(&self, id: HandoverId) -> Result<Option<HandoverRequest>, StoreError> {
        let path = Self::record_path(&self.directory, id);
        match Self::read_record(&path).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list(&self) -> Result<Vec<HandoverRequest>, StoreError> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(record) => records.push(record),
                Err(err) => warn!(file = ?path, error = %err, "Skipping unreadable handover file"),
            }
        }
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    /// Unlike `list`, an unreadable file is an error here: it may hold the task.
    async fn find_task_owner(&self, task_id: TaskId) -> Result<Option<HandoverId>, StoreError> {
        let mut entries = fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let record = Self::read_record(&path).await?;
            if record.task(task_id).is_some() {
                return Ok(Some(record.id));
            }
        }
        Ok(None)
    }

    async fn commit_transition(
        &self,
        id: HandoverId,
        expected_version: u64,
        workflow: WorkflowState,
        entry: HandoverActivityEntry,
    ) -> Result<CommitOutcome, StoreError> {
        self.locked_update(id, move |current| {
            let mut record = current.ok_or(StoreError::HandoverMissing(id))?;
            Ok(Mutation::from_outcome(apply_transition_commit(
                &mut record,
                expected_version,
                workflow,
                entry,
            )))
        })
        .await
    }

    async fn commit_task(&self, update: TaskUpdate) -> Result<CommitOutcome, StoreError> {
        let id = update.handover_id;
        self.locked_update(id, move |current| {
            let mut record = current.ok_or(StoreError::HandoverMissing(id))?;
            Ok(Mutation::from_outcome(apply_task_commit(&mut record, update)?))
        })
        .await
    }
}
