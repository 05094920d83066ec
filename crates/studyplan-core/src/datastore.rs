use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::task::Task;

const TASKS_FILE: &str = "tasks.json";

/// The single persisted record holding the whole task list.
#[derive(Debug, Clone)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let tasks_path = data_dir.join(TASKS_FILE);

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            tasks_path,
        })
    }

    /// Missing, empty and unreadable files all load as an empty list.
    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Vec<Task> {
        match load_json(&self.tasks_path) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    file = %self.tasks_path.display(),
                    error = %format!("{err:#}"),
                    "task data unreadable; starting with an empty list"
                );
                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save(&self, tasks: &[Task]) -> anyhow::Result<()> {
        save_json_atomic(&self.tasks_path, tasks).context("failed to save tasks.json")
    }
}

#[tracing::instrument(skip(path))]
fn load_json(path: &Path) -> anyhow::Result<Vec<Task>> {
    debug!(file = %path.display(), "loading tasks");
    if !path.exists() {
        debug!("no task file yet");
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tasks: Vec<Task> = serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing {}", path.display()))?;

    debug!(count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

#[tracing::instrument(skip(path, tasks))]
fn save_json_atomic(path: &Path, tasks: &[Task]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = tasks.len(), "saving tasks atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, tasks)?;
    writeln!(temp)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
