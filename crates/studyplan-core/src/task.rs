use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::datetime::hm_time_serde;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Study,
    Academic,
    Extracurricular,
    Assignment,
    General,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Study,
        Category::Academic,
        Category::Extracurricular,
        Category::Assignment,
        Category::General,
    ];

    /// Case-insensitive lookup; anything unrecognised lands in `General`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "study" => Category::Study,
            "academic" => Category::Academic,
            "extracurricular" => Category::Extracurricular,
            "assignment" => Category::Assignment,
            _ => Category::General,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Study => "Study",
            Category::Academic => "Academic",
            Category::Extracurricular => "Extracurricular",
            Category::Assignment => "Assignment",
            Category::General => "General",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Study => "📖",
            Category::Academic => "🎓",
            Category::Extracurricular => "🏃",
            Category::Assignment => "📄",
            Category::General => "📋",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse_lenient(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.name().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Nil for records written before ids existed; the repository assigns
    /// one on load.
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,

    pub title: String,

    #[serde(default, alias = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub date: NaiveDate,

    #[serde(with = "hm_time_serde")]
    pub time: NaiveTime,

    #[serde(alias = "type")]
    pub category: Category,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub alerted: bool,
}

impl Task {
    pub fn due_instant(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.due_instant()
    }

    /// Description with blank strings treated as absent.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|desc| !desc.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("task title is required")]
    MissingTitle,
    #[error("task date is required")]
    MissingDate,
    #[error("task time is required")]
    MissingTime,
    #[error("task category is required")]
    MissingCategory,
}

/// Unvalidated form input for a new task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub category: Option<Category>,
}

impl TaskDraft {
    pub fn into_task(self) -> Result<Task, DraftError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DraftError::MissingTitle);
        }
        let date = self.date.ok_or(DraftError::MissingDate)?;
        let time = self.time.ok_or(DraftError::MissingTime)?;
        let category = self.category.ok_or(DraftError::MissingCategory)?;

        let description = self
            .description
            .map(|desc| desc.trim().to_string())
            .filter(|desc| !desc.is_empty());

        Ok(Task {
            id: Uuid::new_v4(),
            title,
            description,
            date,
            time,
            category,
            completed: false,
            alerted: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "  Read chapter 4 ".to_string(),
            description: Some("   ".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 10, 16),
            time: NaiveTime::from_hms_opt(14, 30, 0),
            category: Some(Category::Study),
        }
    }

    #[test]
    fn draft_builds_fresh_task() {
        let task = draft().into_task().expect("valid draft");
        assert_eq!(task.title, "Read chapter 4");
        assert_eq!(task.description, None);
        assert!(!task.completed);
        assert!(!task.alerted);
    }

    #[test]
    fn draft_rejects_missing_fields() {
        let mut no_title = draft();
        no_title.title = "   ".to_string();
        assert_eq!(no_title.into_task(), Err(DraftError::MissingTitle));

        let mut no_time = draft();
        no_time.time = None;
        assert_eq!(no_time.into_task(), Err(DraftError::MissingTime));

        let mut no_category = draft();
        no_category.category = None;
        assert_eq!(no_category.into_task(), Err(DraftError::MissingCategory));
    }

    #[test]
    fn unknown_category_falls_back_to_general() {
        assert_eq!(Category::parse_lenient("ACADEMIC"), Category::Academic);
        assert_eq!(Category::parse_lenient("chores"), Category::General);
    }

    #[test]
    fn reads_legacy_record_without_id() {
        let raw = r#"{"title":"Essay","desc":"","date":"2026-10-16","time":"09:15","type":"Assignment","completed":true,"alerted":false}"#;
        let task: Task = serde_json::from_str(raw).expect("legacy record parses");
        assert!(task.id.is_nil());
        assert_eq!(task.category, Category::Assignment);
        assert_eq!(task.description(), None);
        assert_eq!(task.time, NaiveTime::from_hms_opt(9, 15, 0).expect("time"));
        assert!(task.completed);
    }

    #[test]
    fn due_instant_combines_date_and_time() {
        let task = draft().into_task().expect("valid draft");
        let before = NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(14, 29, 59))
            .expect("instant");
        assert!(!task.is_due(before));
        assert!(task.is_due(task.due_instant()));
    }
}
