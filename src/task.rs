//! Task records and due-date urgency.
//!
//! A task persists only `id`, `title`, `due`, `completed` and `tags`.
//! Priority and days-left are derived from `due` and the evaluation date
//! every time tasks are read; they are never stored.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PriorityConfig;
use crate::error::{Error, Result};

/// `days_left` reported for a due date that does not parse.
pub const UNPARSABLE_DAYS_LEFT: i64 = i64::MAX;

/// Urgency bucket derived from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: High=0, Medium=1, Low=2.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived fields for one task at one evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMeta {
    pub priority: Priority,
    pub days_left: i64,
}

/// Compute priority and days-left for `due` as seen on `today`.
///
/// `due` must be `YYYY-MM-DD`; anything else yields
/// [`UNPARSABLE_DAYS_LEFT`] and `Low` so it sorts last.
pub fn compute_meta(due: &str, today: NaiveDate, thresholds: &PriorityConfig) -> TaskMeta {
    let Some(due_date) = parse_due(due) else {
        return TaskMeta {
            priority: Priority::Low,
            days_left: UNPARSABLE_DAYS_LEFT,
        };
    };

    let days_left = (due_date - today).num_days();
    let priority = if days_left <= thresholds.high_within_days {
        Priority::High
    } else if days_left <= thresholds.medium_within_days {
        Priority::Medium
    } else {
        Priority::Low
    };
    TaskMeta {
        priority,
        days_left,
    }
}

/// Parse a due date in the exact zero-padded `YYYY-MM-DD` form.
///
/// chrono's `%Y-%m-%d` alone also takes `2024-6-3`, leading spaces and a
/// sign, none of which count as a due date here.
pub fn parse_due(due: &str) -> Option<NaiveDate> {
    let bytes = due.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(due, "%Y-%m-%d").ok()
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Due date text as given; kept verbatim even when it does not parse.
    pub due: String,
    pub completed: bool,
    pub tags: String,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        due: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            due: due.into(),
            completed: false,
            tags: tags.into(),
        }
    }

    pub fn meta(&self, today: NaiveDate, thresholds: &PriorityConfig) -> TaskMeta {
        compute_meta(&self.due, today, thresholds)
    }

    /// Snapshot including freshly computed derived fields.
    pub fn view(&self, today: NaiveDate, thresholds: &PriorityConfig) -> TaskView {
        let meta = self.meta(today, thresholds);
        TaskView {
            id: self.id.clone(),
            title: self.title.clone(),
            due: self.due.clone(),
            completed: self.completed,
            priority: meta.priority,
            days_left: meta.days_left,
            tags: self.tags.clone(),
        }
    }
}

/// Read-side snapshot of a task, as rendered to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub due: String,
    pub completed: bool,
    pub priority: Priority,
    pub days_left: i64,
    pub tags: String,
}

/// Ordering applied to listed tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Priority rank, then days left (most urgent first)
    #[default]
    Priority,
    /// Due date text, ascending
    Due,
    /// Title, ascending
    Title,
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" => Ok(SortMode::Priority),
            "due" => Ok(SortMode::Due),
            "title" => Ok(SortMode::Title),
            other => Err(Error::InvalidArgument(format!(
                "unknown sort mode '{other}' (expected priority|due|title)"
            ))),
        }
    }
}

/// Sort snapshots in place. The sort is stable, so ties keep insertion order.
pub fn sort_tasks(tasks: &mut [TaskView], mode: SortMode) {
    match mode {
        SortMode::Priority => tasks.sort_by(|left, right| {
            left.priority
                .rank()
                .cmp(&right.priority.rank())
                .then_with(|| left.days_left.cmp(&right.days_left))
        }),
        SortMode::Due => tasks.sort_by(|left, right| left.due.cmp(&right.due)),
        SortMode::Title => tasks.sort_by(|left, right| left.title.cmp(&right.title)),
    }
}

/// Filter and ordering for task listings.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Case-insensitive substring matched against title and tags
    pub search: Option<String>,
    pub sort: SortMode,
}

impl ListQuery {
    pub fn matches(&self, task: &TaskView) -> bool {
        let Some(search) = self.search.as_deref() else {
            return true;
        };
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle) || task.tags.to_lowercase().contains(&needle)
    }

    pub fn apply(&self, tasks: Vec<TaskView>) -> Vec<TaskView> {
        let mut tasks: Vec<TaskView> = tasks.into_iter().filter(|t| self.matches(t)).collect();
        sort_tasks(&mut tasks, self.sort);
        tasks
    }
}

/// Counts shown alongside a task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
}

impl TaskSummary {
    pub fn of(tasks: &[TaskView]) -> Self {
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|task| task.completed).count(),
        }
    }
}

/// Validate a user-supplied due date. Empty input is accepted.
pub fn validate_due(due: &str) -> Result<()> {
    if due.is_empty() || parse_due(due).is_some() {
        return Ok(());
    }
    Err(Error::InvalidArgument(format!(
        "due date '{due}' is not YYYY-MM-DD"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn view(id: &str, due: &str, today: NaiveDate) -> TaskView {
        Task::new(id, id, due, "").view(today, &PriorityConfig::default())
    }

    #[test]
    fn meta_buckets_follow_thresholds() {
        let today = day(2024, 6, 1);
        let thresholds = PriorityConfig::default();
        let cases = [
            ("2024-05-30", Priority::High, -2),
            ("2024-06-01", Priority::High, 0),
            ("2024-06-04", Priority::High, 3),
            ("2024-06-05", Priority::Medium, 4),
            ("2024-06-08", Priority::Medium, 7),
            ("2024-06-09", Priority::Low, 8),
        ];
        for (due, priority, days_left) in cases {
            let meta = compute_meta(due, today, &thresholds);
            assert_eq!(meta.priority, priority, "due {due}");
            assert_eq!(meta.days_left, days_left, "due {due}");
        }
    }

    #[test]
    fn unparsable_due_is_low_with_sentinel() {
        let today = day(2024, 6, 1);
        for due in ["", "tomorrow", "2024-13-01", "2024/06/02"] {
            let meta = compute_meta(due, today, &PriorityConfig::default());
            assert_eq!(meta.priority, Priority::Low);
            assert_eq!(meta.days_left, UNPARSABLE_DAYS_LEFT);
        }
    }

    #[test]
    fn custom_thresholds_apply() {
        let thresholds = PriorityConfig {
            high_within_days: 0,
            medium_within_days: 1,
        };
        let today = day(2024, 1, 1);
        assert_eq!(compute_meta("2024-01-01", today, &thresholds).priority, Priority::High);
        assert_eq!(compute_meta("2024-01-02", today, &thresholds).priority, Priority::Medium);
        assert_eq!(compute_meta("2024-01-03", today, &thresholds).priority, Priority::Low);
    }

    #[test]
    fn priority_sort_orders_by_rank_then_days() {
        let today = day(2024, 6, 1);
        let mut tasks = vec![
            view("ten", "2024-06-11", today),
            view("two", "2024-06-03", today),
            view("five", "2024-06-06", today),
            view("bad", "nope", today),
            view("overdue", "2024-05-20", today),
        ];
        sort_tasks(&mut tasks, SortMode::Priority);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["overdue", "two", "five", "ten", "bad"]);
    }

    #[test]
    fn priority_sort_is_stable_on_ties() {
        let today = day(2024, 6, 1);
        let mut tasks = vec![
            view("first", "2024-06-02", today),
            view("second", "2024-06-02", today),
            view("third", "2024-06-02", today),
        ];
        sort_tasks(&mut tasks, SortMode::Priority);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn alternate_sort_modes() {
        let today = day(2024, 6, 1);
        let mut tasks = vec![
            view("b", "2024-07-01", today),
            view("c", "2024-06-01", today),
            view("a", "2024-08-01", today),
        ];
        sort_tasks(&mut tasks, SortMode::Due);
        assert_eq!(tasks[0].id, "c");
        sort_tasks(&mut tasks, SortMode::Title);
        assert_eq!(tasks[0].id, "a");
    }

    #[test]
    fn sort_mode_parses() {
        assert_eq!("Priority".parse::<SortMode>().unwrap(), SortMode::Priority);
        assert_eq!("due".parse::<SortMode>().unwrap(), SortMode::Due);
        assert!("size".parse::<SortMode>().is_err());
    }

    #[test]
    fn search_matches_title_or_tags() {
        let today = day(2024, 6, 1);
        let mut task = view("x", "2024-06-02", today);
        task.title = "Write Report".to_string();
        task.tags = "work,q3".to_string();

        let query = |q: &str| ListQuery {
            search: Some(q.to_string()),
            sort: SortMode::Priority,
        };
        assert!(query("report").matches(&task));
        assert!(query("Q3").matches(&task));
        assert!(query("  ").matches(&task));
        assert!(!query("groceries").matches(&task));
        assert!(ListQuery::default().matches(&task));
    }

    #[test]
    fn summary_counts_completed() {
        let today = day(2024, 6, 1);
        let mut done = view("done", "2024-06-02", today);
        done.completed = true;
        let open = view("open", "2024-06-02", today);
        assert_eq!(
            TaskSummary::of(&[done, open]),
            TaskSummary {
                total: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn view_serializes_camel_case() {
        let today = day(2024, 6, 1);
        let json = serde_json::to_value(view("id-1", "2024-06-02", today)).unwrap();
        assert_eq!(json["daysLeft"], 1);
        assert_eq!(json["priority"], "High");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn validate_due_accepts_empty_and_iso() {
        assert!(validate_due("").is_ok());
        assert!(validate_due("2024-02-29").is_ok());
        assert!(validate_due("2023-02-29").is_err());
        for loose in ["2024-6-3", " 2024-06-03", "+2024-06-03", "2024-06-3"] {
            assert!(validate_due(loose).is_err(), "due {loose:?}");
        }
    }

    #[test]
    fn loosely_formatted_due_is_unparsable() {
        let today = day(2024, 6, 1);
        for due in [
            "2024-6-3",
            " 2024-06-03",
            "+2024-06-03",
            "2024-06-3",
            "2024-06-03 ",
            "02024-06-03",
        ] {
            let meta = compute_meta(due, today, &PriorityConfig::default());
            assert_eq!(meta.priority, Priority::Low, "due {due:?}");
            assert_eq!(meta.days_left, UNPARSABLE_DAYS_LEFT, "due {due:?}");
        }
        assert_eq!(parse_due("2024-06-03"), Some(day(2024, 6, 3)));
    }
}
