use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::task::Task;

/// Ids of tasks whose due instant has passed and whose alarm has not fired yet.
pub fn evaluate(tasks: &[Task], now: NaiveDateTime) -> Vec<Uuid> {
    tasks
        .iter()
        .filter(|task| !task.alerted && task.is_due(now))
        .map(|task| task.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::task::{Category, TaskDraft};

    fn task_at(hour: u32, alerted: bool) -> Task {
        let mut task = TaskDraft {
            title: format!("due {hour}"),
            description: None,
            date: NaiveDate::from_ymd_opt(2026, 10, 16),
            time: NaiveTime::from_hms_opt(hour, 0, 0),
            category: Some(Category::Study),
        }
        .into_task()
        .expect("valid draft");
        task.alerted = alerted;
        task
    }

    #[test]
    fn picks_passed_unalerted_tasks_only() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("now");
        let tasks = vec![task_at(9, false), task_at(10, true), task_at(12, false), task_at(15, false)];

        let due = evaluate(&tasks, now);
        assert_eq!(due, vec![tasks[0].id, tasks[2].id]);
    }

    #[test]
    fn completed_tasks_still_alarm() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("now");
        let mut task = task_at(9, false);
        task.completed = true;
        assert_eq!(evaluate(&[task.clone()], now), vec![task.id]);
    }
}
