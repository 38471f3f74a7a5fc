use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One printable character, or printable characters at both ends with up
/// to 62 in between. Rejects empty names, surrounding whitespace, and
/// anything longer than 64 characters.
static RE_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S(?:.{0,62}\S)?$").unwrap());

/// Workflow state of a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] =
        [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed];

    /// Parse a wire status string. Unknown values are rejected rather than
    /// bucketed; see DESIGN.md for the policy choice.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TaskStatus::parse(s)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated tag name. Construction is the only place validation
/// happens; everything downstream can rely on the name being well-formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct TagName(String);

impl TagName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if RE_TAG_NAME.is_match(&name) {
            Ok(TagName(name))
        } else {
            Err(Error::InvalidTagName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TagName {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        TagName::new(name)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A comment attached to a task. Comments ride along on task records but
/// never feed the aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One unit of work as the aggregation core sees it.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: BTreeSet<TagName>,
    pub comments: Vec<Comment>,
}

impl TaskRecord {
    /// Calendar date the task was completed on. `None` unless the task is
    /// completed and carries a completion timestamp.
    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_timestamp().map(|dt| dt.date_naive())
    }

    /// Completion timestamp, gated on status. A stray `completed_at` on a
    /// pending or in-progress task does not count.
    pub fn completion_timestamp(&self) -> Option<DateTime<Utc>> {
        if self.status == TaskStatus::Completed {
            self.completed_at
        } else {
            None
        }
    }

    /// True for a completed task whose completion time is unknown. Such
    /// tasks are excluded from time-based averages and reported through
    /// the diagnostics counter instead.
    pub fn completion_time_unknown(&self) -> bool {
        self.status == TaskStatus::Completed && self.completed_at.is_none()
    }
}

/// A caller-defined label. Name uniqueness across the canonical tag list
/// is the caller's invariant; the aggregation only consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub id: String,
    pub name: TagName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_util::parse_timestamp;

    fn task(status: TaskStatus, completed_at: Option<&str>) -> TaskRecord {
        TaskRecord {
            id: "t1".to_string(),
            title: "Task".to_string(),
            description: String::new(),
            status,
            created_at: parse_timestamp("2025-01-01T08:00:00Z").unwrap(),
            completed_at: completed_at.map(|s| parse_timestamp(s).unwrap()),
            tags: BTreeSet::new(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TaskStatus::parse("pending").unwrap(), TaskStatus::Pending);
        assert_eq!(
            TaskStatus::parse("in_progress").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(
            TaskStatus::parse("completed").unwrap(),
            TaskStatus::Completed
        );
        assert_eq!("pending".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
    }

    #[test]
    fn test_status_parse_unknown_rejected() {
        match TaskStatus::parse("archived") {
            Err(Error::InvalidStatus(s)) => assert_eq!(s, "archived"),
            other => panic!("expected InvalidStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_tag_name_valid() {
        assert_eq!(TagName::new("urgent").unwrap().as_str(), "urgent");
        assert_eq!(TagName::new("a").unwrap().as_str(), "a");
        assert_eq!(
            TagName::new("two words").unwrap().as_str(),
            "two words"
        );
    }

    #[test]
    fn test_tag_name_invalid() {
        assert!(TagName::new("").is_err());
        assert!(TagName::new(" leading").is_err());
        assert!(TagName::new("trailing ").is_err());
        assert!(TagName::new("x".repeat(65)).is_err());
    }

    #[test]
    fn test_tag_name_max_length() {
        assert!(TagName::new("x".repeat(64)).is_ok());
    }

    #[test]
    fn test_completion_date_requires_completed_status() {
        let done = task(TaskStatus::Completed, Some("2025-01-05T10:00:00Z"));
        assert_eq!(
            done.completion_date(),
            Some(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())
        );

        // Stray completed_at on an in-progress task is ignored
        let stray = task(TaskStatus::InProgress, Some("2025-01-05T10:00:00Z"));
        assert_eq!(stray.completion_date(), None);
        assert!(!stray.completion_time_unknown());
    }

    #[test]
    fn test_completion_time_unknown() {
        let missing = task(TaskStatus::Completed, None);
        assert!(missing.completion_time_unknown());
        assert_eq!(missing.completion_date(), None);

        let pending = task(TaskStatus::Pending, None);
        assert!(!pending.completion_time_unknown());
    }
}
