// Data models for TaskHub

use crate::error::TaskError;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unit of work tracked by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub category: Category,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a task from an add payload; `id` and `created_at` come from the store
    pub fn from_new(id: String, new: NewTask, created_at: DateTime<Utc>) -> Self {
        let mut task = Self {
            id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            status: Status::NotStarted,
            category: new.category,
            due_date: new.due_date,
            created_at,
            completed_at: None,
        };
        task.set_status(new.status, created_at);
        task
    }

    /// Change status, keeping `completed_at` present exactly when the task is done
    ///
    /// Re-marking a done task as done keeps its original completion time.
    pub fn set_status(&mut self, status: Status, now: DateTime<Utc>) {
        match (self.status, status) {
            (Status::Done, Status::Done) => {
                self.completed_at.get_or_insert(now);
            }
            (_, Status::Done) => self.completed_at = Some(now),
            _ => self.completed_at = None,
        }
        self.status = status;
    }

    /// Restore the done/`completed_at` pairing on data that came from outside the store
    ///
    /// A done task missing its completion time gets `created_at`; any other task
    /// loses a stray completion time. Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        match (self.status, self.completed_at) {
            (Status::Done, None) => {
                self.completed_at = Some(self.created_at);
                true
            }
            (Status::Done, Some(_)) | (_, None) => false,
            (_, Some(_)) => {
                self.completed_at = None;
                true
            }
        }
    }

    /// Merge a partial update into this task
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}

/// Payload for creating a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "today")]
    pub due_date: DateTime<Utc>,
}

impl NewTask {
    /// A task with the given title and the entry-form defaults for everything else
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            category: Category::default(),
            due_date: today(),
        }
    }
}

/// Partial update: `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Aggregate counts over a task collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "rendah")]
    Low,
    #[default]
    #[serde(alias = "sedang")]
    Medium,
    #[serde(alias = "tinggi")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[serde(alias = "belum")]
    NotStarted,
    #[serde(alias = "proses")]
    InProgress,
    #[serde(alias = "selesai")]
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::NotStarted, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "not-started",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Next stage in the toggle cycle: not-started, in-progress, done, then back
    pub fn next(self) -> Status {
        match self {
            Status::NotStarted => Status::InProgress,
            Status::InProgress => Status::Done,
            Status::Done => Status::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    #[serde(alias = "pekerjaan")]
    Work,
    #[serde(alias = "pribadi")]
    Personal,
    #[serde(alias = "belajar")]
    Learning,
    #[serde(alias = "lainnya")]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Personal,
        Category::Learning,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Learning => "learning",
            Category::Other => "other",
        }
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| TaskError::InvalidValue {
                kind: "priority",
                value: s.to_string(),
                expected: "low, medium, high",
            })
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| TaskError::InvalidValue {
                kind: "status",
                value: s.to_string(),
                expected: "not-started, in-progress, done",
            })
    }
}

impl FromStr for Category {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| TaskError::InvalidValue {
                kind: "category",
                value: s.to_string(),
                expected: "work, personal, learning, other",
            })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current time, truncated to millisecond precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Midnight UTC of the current day
pub fn today() -> DateTime<Utc> {
    midnight_utc(Utc::now().date_naive())
}

pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// Parse a due date given either as `YYYY-MM-DD` (midnight UTC) or as RFC 3339
pub fn parse_due_date(s: &str) -> eyre::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight_utc(date));
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| eyre::eyre!("Invalid due date '{}': {} (expected YYYY-MM-DD or RFC 3339)", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        Task {
            id: "task-1".to_string(),
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            priority: Priority::High,
            status: Status::NotStarted,
            category: Category::Work,
            due_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap(),
            completed_at: None,
        }
    }

    #[test]
    fn test_now_has_millisecond_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
        // After 2020
        assert!(ts.timestamp_millis() > 1_600_000_000_000);
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&Status::NotStarted).unwrap(), "\"not-started\"");
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(serde_json::to_string(&Status::Done).unwrap(), "\"done\"");
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Category::Learning).unwrap(), "\"learning\"");
    }

    #[test]
    fn test_as_str_matches_serde() {
        for status in Status::ALL {
            assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{}\"", status));
        }
        for priority in Priority::ALL {
            assert_eq!(serde_json::to_string(&priority).unwrap(), format!("\"{}\"", priority));
        }
        for category in Category::ALL {
            assert_eq!(serde_json::to_string(&category).unwrap(), format!("\"{}\"", category));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("in_progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("not-started".parse::<Status>().unwrap(), Status::NotStarted);
        assert_eq!(" personal ".parse::<Category>().unwrap(), Category::Personal);

        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(matches!(err, TaskError::InvalidValue { kind: "priority", .. }));
    }

    #[test]
    fn test_task_wire_shape() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], "task-1");
        assert_eq!(json["dueDate"], "2024-06-01T00:00:00Z");
        assert_eq!(json["createdAt"], "2024-05-20T09:30:00Z");
        assert_eq!(json["status"], "not-started");
        assert!(json.get("completedAt").is_none());
    }

    #[test]
    fn test_task_accepts_js_iso_strings() {
        let json = r#"{
            "id": "1717000000000",
            "title": "Read book",
            "description": "",
            "priority": "low",
            "status": "done",
            "category": "personal",
            "dueDate": "2024-06-01T00:00:00.000Z",
            "createdAt": "2024-05-29T16:26:40.000Z",
            "completedAt": "2024-05-30T08:00:00.000Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.completed_at, Some(Utc.with_ymd_and_hms(2024, 5, 30, 8, 0, 0).unwrap()));
    }

    #[test]
    fn test_status_cycle() {
        assert_eq!(Status::NotStarted.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Done);
        assert_eq!(Status::Done.next(), Status::NotStarted);
    }

    #[test]
    fn test_set_status_maintains_completed_at() {
        let mut task = sample_task();
        let t1 = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();

        task.set_status(Status::Done, t1);
        assert_eq!(task.completed_at, Some(t1));

        // Already done: original completion time is kept
        task.set_status(Status::Done, t2);
        assert_eq!(task.completed_at, Some(t1));

        task.set_status(Status::InProgress, t2);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_apply_patch() {
        let mut task = sample_task();
        let patch = TaskPatch {
            title: Some("Write final report".to_string()),
            priority: Some(Priority::Low),
            ..TaskPatch::default()
        };

        task.apply(patch, now());
        assert_eq!(task.title, "Write final report");
        assert_eq!(task.priority, Priority::Low);
        // Untouched fields
        assert_eq!(task.description, "Quarterly numbers");
        assert_eq!(task.category, Category::Work);
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn test_from_new_done_sets_completed_at() {
        let created = Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap();
        let mut new = NewTask::new("Already finished");
        new.status = Status::Done;

        let task = Task::from_new("x".to_string(), new, created);
        assert_eq!(task.completed_at, Some(created));
    }

    #[test]
    fn test_new_task_defaults() {
        let new = NewTask::new("Something");
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.status, Status::NotStarted);
        assert_eq!(new.category, Category::Work);
        assert_eq!(new.due_date, today());
        assert!(new.description.is_empty());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(
            parse_due_date("2024-06-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_due_date("2024-06-01T15:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap()
        );
        assert!(parse_due_date("June 1st").is_err());
    }

    #[test]
    fn test_set_done_on_done_task_without_completion_fills_it() {
        let mut task = sample_task();
        task.status = Status::Done;
        let t1 = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();

        task.set_status(Status::Done, t1);
        assert_eq!(task.completed_at, Some(t1));
    }

    #[test]
    fn test_normalize_done_without_completion() {
        let mut task = sample_task();
        task.status = Status::Done;

        assert!(task.normalize());
        assert_eq!(task.completed_at, Some(task.created_at));
        assert!(!task.normalize());
    }

    #[test]
    fn test_normalize_clears_stray_completion() {
        let mut task = sample_task();
        task.status = Status::NotStarted;
        task.completed_at = Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());

        assert!(task.normalize());
        assert_eq!(task.completed_at, None);
        assert!(!task.normalize());
    }

    #[test]
    fn test_task_accepts_legacy_enum_values() {
        let json = r#"{
            "id": "1717000000000",
            "title": "Belajar Rust",
            "description": "",
            "priority": "tinggi",
            "status": "selesai",
            "category": "belajar",
            "dueDate": "2024-06-01T00:00:00.000Z",
            "createdAt": "2024-05-29T16:26:40.000Z"
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.category, Category::Learning);

        // Written back in the current vocabulary
        let out = serde_json::to_value(&task).unwrap();
        assert_eq!(out["priority"], "high");
        assert_eq!(out["status"], "done");
        assert_eq!(out["category"], "learning");

        for (legacy, status) in [("belum", Status::NotStarted), ("proses", Status::InProgress)] {
            let parsed: Status = serde_json::from_str(&format!("\"{}\"", legacy)).unwrap();
            assert_eq!(parsed, status);
        }
        for (legacy, priority) in [("rendah", Priority::Low), ("sedang", Priority::Medium)] {
            let parsed: Priority = serde_json::from_str(&format!("\"{}\"", legacy)).unwrap();
            assert_eq!(parsed, priority);
        }
        for (legacy, category) in [
            ("pekerjaan", Category::Work),
            ("pribadi", Category::Personal),
            ("lainnya", Category::Other),
        ] {
            let parsed: Category = serde_json::from_str(&format!("\"{}\"", legacy)).unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::status(Status::Done).is_empty());
    }
}
