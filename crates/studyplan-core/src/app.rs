use std::io::Write;
use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::due;
use crate::filter::FilterMode;
use crate::notify::{Notifier, ToastQueue};
use crate::render::Renderer;
use crate::repository::TaskRepository;
use crate::task::{Task, TaskDraft};
use crate::timer::{COMPLETION_MESSAGE, Timer, TimerEvent};

const MIN_PREFIX_LEN: usize = 4;

/// Everything the handlers mutate, in one place. Task changes go through the
/// repository; announcements go through the notifier and the toast queue.
pub struct AppState<N: Notifier> {
    repo: TaskRepository,
    notifier: N,
    toasts: ToastQueue,
    pub filter: FilterMode,
    pub timer: Timer,
}

impl<N: Notifier> AppState<N> {
    pub fn new(repo: TaskRepository, notifier: N, timer: Timer) -> Self {
        Self {
            repo,
            notifier,
            toasts: ToastQueue::default(),
            filter: FilterMode::All,
            timer,
        }
    }

    pub fn repo(&self) -> &TaskRepository {
        &self.repo
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    /// Translates what a user typed (a list number or a uuid prefix) into a
    /// task id, against the list as it stands now.
    pub fn resolve(&self, selector: &str) -> Option<Uuid> {
        let selector = selector.trim();
        if let Ok(number) = selector.parse::<usize>()
            && let Some(id) = number.checked_sub(1).and_then(|pos| self.repo.id_at(pos))
        {
            return Some(id);
        }
        if selector.len() < MIN_PREFIX_LEN {
            return None;
        }

        let needle = selector.to_ascii_lowercase();
        let mut matches = self
            .repo
            .tasks()
            .iter()
            .filter(|task| task.id.to_string().starts_with(&needle));
        let first = matches.next()?;
        if matches.next().is_some() {
            debug!(selector, "ambiguous task selector");
            return None;
        }
        Some(first.id)
    }

    #[tracing::instrument(skip(self, draft))]
    pub fn add(&mut self, draft: TaskDraft) -> anyhow::Result<Task> {
        let task = self.repo.add(draft)?;
        self.announce(&format!("\"{}\" added successfully!", task.title));
        Ok(task)
    }

    pub fn toggle_complete(&mut self, id: Uuid) -> anyhow::Result<Option<bool>> {
        self.repo.toggle_complete(id)
    }

    pub fn delete(&mut self, id: Uuid) -> anyhow::Result<Option<Task>> {
        self.repo.delete(id)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> anyhow::Result<bool> {
        self.repo.reorder(from, to)
    }

    /// Fires the alarm for every task that became due since the last check.
    /// Each task alarms at most once; the alerted flags are persisted before
    /// returning.
    #[tracing::instrument(skip(self, now))]
    pub fn check_due(&mut self, now: NaiveDateTime) -> anyhow::Result<usize> {
        let ids = due::evaluate(self.repo.tasks(), now);
        if ids.is_empty() {
            return Ok(0);
        }

        let marked = self.repo.mark_alerted(&ids)?;
        for task in &marked {
            info!(id = %task.id, title = %task.title, "task due");
            self.announce(&format!("{} is due now!", task.title));
            self.notifier.alarm();
        }
        Ok(marked.len())
    }

    /// Due check, then the task list and progress summary for `self.filter`.
    pub fn render<W: Write>(
        &mut self,
        renderer: &Renderer,
        mut out: W,
        now: NaiveDateTime,
    ) -> anyhow::Result<()> {
        self.check_due(now)?;
        renderer.write_task_list(&mut out, self.repo.tasks(), self.filter, now)?;
        writeln!(out)?;
        renderer.write_progress(&mut out, self.repo.progress())?;
        Ok(())
    }

    pub fn tick_timer(&mut self) -> TimerEvent {
        let event = self.timer.tick();
        if event == TimerEvent::Completed {
            self.announce(COMPLETION_MESSAGE);
            self.notifier.alarm();
        }
        event
    }

    fn announce(&mut self, message: &str) {
        self.toasts.push(message, Instant::now());
        self.notifier.notify(message);
    }
}
