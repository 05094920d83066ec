use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use tracing::trace;

use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum FilterMode {
  #[default]
  All,
  Pending,
  Completed
}

impl FilterMode {
  pub fn matches(
    self,
    task: &Task
  ) -> bool {
    match self {
      | FilterMode::All => true,
      | FilterMode::Pending => {
        !task.completed
      }
      | FilterMode::Completed => {
        task.completed
      }
    }
  }

  /// Matching tasks paired with their
  /// position in the full list, in list
  /// order.
  pub fn select<'a>(
    self,
    tasks: &'a [Task]
  ) -> Vec<(usize, &'a Task)> {
    let selected: Vec<_> = tasks
      .iter()
      .enumerate()
      .filter(|(_, task)| {
        self.matches(task)
      })
      .collect();
    trace!(
      mode = %self,
      total = tasks.len(),
      selected = selected.len(),
      "applied filter"
    );
    selected
  }
}

impl fmt::Display for FilterMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(match self {
      | FilterMode::All => "all",
      | FilterMode::Pending => "pending",
      | FilterMode::Completed => {
        "completed"
      }
    })
  }
}

impl FromStr for FilterMode {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(FilterMode::All),
      | "pending" => {
        Ok(FilterMode::Pending)
      }
      | "completed" | "done" => {
        Ok(FilterMode::Completed)
      }
      | other => {
        Err(anyhow!(
          "unknown filter '{other}', \
           expected all, pending or \
           completed"
        ))
      }
    }
  }
}
