use std::fmt;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::datastore::DataStore;
use crate::task::{Task, TaskDraft};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(tasks: &[Task]) -> Self {
        Self {
            completed: tasks.iter().filter(|task| task.completed).count(),
            total: tasks.len(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Rounded to the nearest whole percent; an empty list is 0%.
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} tasks", self.completed, self.total)
    }
}

/// Ordered, id-keyed task list. Every successful mutation rewrites the store
/// and refreshes the progress summary before returning.
#[derive(Debug)]
pub struct TaskRepository {
    store: DataStore,
    tasks: Vec<Task>,
    progress: Progress,
}

impl TaskRepository {
    #[tracing::instrument(skip(store))]
    pub fn load(store: DataStore) -> Self {
        let mut tasks = store.load();

        let mut assigned = 0;
        for task in tasks.iter_mut().filter(|task| task.id.is_nil()) {
            task.id = Uuid::new_v4();
            assigned += 1;
        }
        if assigned > 0 {
            info!(assigned, "assigned ids to legacy tasks");
            if let Err(err) = store.save(&tasks) {
                warn!(error = %format!("{err:#}"), "failed to persist assigned task ids");
            }
        }

        let progress = Progress::of(&tasks);
        info!(count = tasks.len(), "loaded task repository");
        Self {
            store,
            tasks,
            progress,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    pub fn id_at(&self, position: usize) -> Option<Uuid> {
        self.tasks.get(position).map(|task| task.id)
    }

    #[tracing::instrument(skip(self, draft))]
    pub fn add(&mut self, draft: TaskDraft) -> anyhow::Result<Task> {
        let task = draft.into_task()?;
        debug!(id = %task.id, title = %task.title, "adding task");
        self.tasks.push(task.clone());
        self.commit()?;
        Ok(task)
    }

    /// Returns the new completion state, or `None` for an unknown id.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn toggle_complete(&mut self, id: Uuid) -> anyhow::Result<Option<bool>> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("toggle ignored for unknown task");
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        self.commit()?;
        Ok(Some(completed))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn delete(&mut self, id: Uuid) -> anyhow::Result<Option<Task>> {
        let Some(position) = self.position_of(id) else {
            debug!("delete ignored for unknown task");
            return Ok(None);
        };
        let removed = self.tasks.remove(position);
        self.commit()?;
        Ok(Some(removed))
    }

    /// Moves the task at `from` so it ends up at `to`. Out-of-range positions
    /// leave the list untouched.
    #[tracing::instrument(skip(self))]
    pub fn reorder(&mut self, from: usize, to: usize) -> anyhow::Result<bool> {
        let len = self.tasks.len();
        if from >= len || to >= len {
            debug!(len, "reorder ignored for out-of-range position");
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.commit()?;
        Ok(true)
    }

    /// Flags the given tasks as alerted and returns the ones that changed.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn mark_alerted(&mut self, ids: &[Uuid]) -> anyhow::Result<Vec<Task>> {
        let mut marked = Vec::new();
        for task in &mut self.tasks {
            if !task.alerted && ids.contains(&task.id) {
                task.alerted = true;
                marked.push(task.clone());
            }
        }
        if !marked.is_empty() {
            self.commit()?;
        }
        Ok(marked)
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        self.progress = Progress::of(&self.tasks);
        debug!(
            completed = self.progress.completed,
            total = self.progress.total,
            "progress recomputed"
        );
        self.store.save(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::task::Category;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2026, 10, 16),
            time: NaiveTime::from_hms_opt(18, 0, 0),
            category: Some(Category::Academic),
        }
    }

    fn repo_with(titles: &[&str]) -> (TempDir, TaskRepository) {
        let temp = tempdir().expect("tempdir");
        let store = DataStore::open(temp.path()).expect("open datastore");
        let mut repo = TaskRepository::load(store);
        for title in titles {
            repo.add(draft(title)).expect("add task");
        }
        (temp, repo)
    }

    fn titles(repo: &TaskRepository) -> Vec<&str> {
        repo.tasks().iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn add_survives_reload() {
        let (temp, repo) = repo_with(&["Revise notes"]);
        drop(repo);

        let store = DataStore::open(temp.path()).expect("reopen datastore");
        let reloaded = TaskRepository::load(store);
        assert_eq!(reloaded.len(), 1);
        let task = &reloaded.tasks()[0];
        assert_eq!(task.title, "Revise notes");
        assert!(!task.completed);
        assert!(!task.alerted);
    }

    #[test]
    fn reload_keeps_seconds_of_due_time() {
        let (temp, mut repo) = repo_with(&[]);
        let mut precise = draft("Submit lab");
        precise.time = NaiveTime::from_hms_opt(14, 30, 45);
        let added = repo.add(precise).expect("add");
        let early = NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(14, 30, 10))
            .expect("instant");
        assert!(!added.is_due(early));
        drop(repo);

        let store = DataStore::open(temp.path()).expect("reopen datastore");
        let reloaded = TaskRepository::load(store);
        assert_eq!(reloaded.tasks(), &[added.clone()]);
        assert!(!reloaded.tasks()[0].is_due(early));
    }

    #[test]
    fn legacy_ids_are_assigned_once() {
        let temp = tempdir().expect("tempdir");
        let store = DataStore::open(temp.path()).expect("open datastore");
        std::fs::write(
            &store.tasks_path,
            r#"[{"title":"Essay","date":"2026-10-16","time":"09:15","type":"Assignment"}]"#,
        )
        .expect("write legacy file");

        let first = TaskRepository::load(store.clone());
        let id = first.id_at(0).expect("id");
        assert!(!id.is_nil());

        let second = TaskRepository::load(store);
        assert_eq!(second.id_at(0), Some(id));
    }

    #[test]
    fn add_rejects_invalid_draft() {
        let (_temp, mut repo) = repo_with(&[]);
        let mut bad = draft("x");
        bad.date = None;
        assert!(repo.add(bad).is_err());
        assert!(repo.is_empty());
    }

    #[test]
    fn toggle_twice_restores_state() {
        let (_temp, mut repo) = repo_with(&["a", "b"]);
        let id = repo.id_at(1).expect("id");

        assert_eq!(repo.toggle_complete(id).expect("toggle"), Some(true));
        assert_eq!(repo.progress().percent(), 50);
        assert_eq!(repo.toggle_complete(id).expect("toggle"), Some(false));
        assert!(!repo.tasks()[1].completed);
        assert_eq!(repo.progress().completed, 0);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let (_temp, mut repo) = repo_with(&["a"]);
        let stale = Uuid::new_v4();
        assert_eq!(repo.toggle_complete(stale).expect("toggle"), None);
        assert!(repo.delete(stale).expect("delete").is_none());
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn delete_shifts_later_tasks_down() {
        let (_temp, mut repo) = repo_with(&["a", "b", "c", "d"]);
        let before: Vec<Uuid> = repo.tasks().iter().map(|t| t.id).collect();

        let removed = repo.delete(before[1]).expect("delete").expect("removed");
        assert_eq!(removed.title, "b");
        assert_eq!(titles(&repo), vec!["a", "c", "d"]);
        assert_eq!(repo.id_at(0), Some(before[0]));
        assert_eq!(repo.id_at(1), Some(before[2]));
        assert_eq!(repo.id_at(2), Some(before[3]));
    }

    #[test]
    fn reorder_splices_without_touching_fields() {
        let (_temp, mut repo) = repo_with(&["a", "b", "c"]);
        assert!(repo.reorder(0, 2).expect("reorder"));
        assert_eq!(titles(&repo), vec!["b", "c", "a"]);
        assert!(repo.reorder(2, 0).expect("reorder"));
        assert_eq!(titles(&repo), vec!["a", "b", "c"]);
        assert!(!repo.reorder(0, 3).expect("reorder"));
        assert_eq!(titles(&repo), vec!["a", "b", "c"]);
    }

    #[test]
    fn progress_is_monotonic_while_completing() {
        let (_temp, mut repo) = repo_with(&["a", "b", "c"]);
        assert_eq!(repo.progress().percent(), 0);

        let mut last = 0;
        for position in 0..repo.len() {
            let id = repo.id_at(position).expect("id");
            repo.toggle_complete(id).expect("toggle");
            let pct = repo.progress().percent();
            assert!(pct >= last);
            last = pct;
        }
        assert_eq!(repo.progress().to_string(), "3/3 tasks");
        assert_eq!(last, 100);
    }

    #[test]
    fn empty_progress_is_zero_percent() {
        assert_eq!(Progress::default().percent(), 0);
        assert_eq!(Progress { completed: 1, total: 3 }.percent(), 33);
        assert_eq!(Progress { completed: 2, total: 3 }.percent(), 67);
    }

    #[test]
    fn mark_alerted_only_reports_changes() {
        let (_temp, mut repo) = repo_with(&["a", "b"]);
        let id = repo.id_at(0).expect("id");
        assert_eq!(repo.mark_alerted(&[id]).expect("mark").len(), 1);
        assert!(repo.mark_alerted(&[id]).expect("mark").is_empty());
        assert!(repo.get(id).expect("task").alerted);
    }
}
