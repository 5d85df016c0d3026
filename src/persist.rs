//! Backing files for the task and session collections.
//!
//! Each collection is a JSON array of flat objects, rewritten in full on
//! every save:
//!
//! ```text
//! tasks.json     [{"id":..,"title":..,"due":..,"completed":..,"tags":..}, ..]
//! sessions.json  [{"id":..,"taskId":..,"start":..,"end":..,"completed":..}, ..]
//! ```
//!
//! Writes go through a temp file and rename while holding `<file>.lock`.
//! Reads use the lenient decoder, then rebuild typed records field by field
//! with defaults for anything missing.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::clock::format_date;
use crate::codec::{self, FlatRecord, Value};
use crate::config::Config;
use crate::error::Result;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::session::PomodoroSession;
use crate::task::Task;

/// Title given to persisted tasks that have none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// File locations for both collections.
#[derive(Debug, Clone)]
pub struct Persistence {
    tasks_path: PathBuf,
    sessions_path: PathBuf,
    lock_timeout_ms: u64,
}

impl Persistence {
    pub fn new(tasks_path: impl Into<PathBuf>, sessions_path: impl Into<PathBuf>) -> Self {
        Self {
            tasks_path: tasks_path.into(),
            sessions_path: sessions_path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Files named by `config`, resolved against `data_dir`
    pub fn from_config(config: &Config, data_dir: &Path) -> Self {
        Self::new(config.tasks_path(data_dir), config.sessions_path(data_dir))
            .with_lock_timeout(config.storage.lock_timeout_ms)
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    pub fn sessions_path(&self) -> &Path {
        &self.sessions_path
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        let text = encode_tasks(tasks);
        lock::write_atomic_locked(&self.tasks_path, text.as_bytes(), self.lock_timeout_ms)?;
        tracing::debug!(path = %self.tasks_path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Load the task collection. A missing file is an empty collection.
    ///
    /// `today` fills in records without a `due` field.
    pub fn load_tasks(&self, today: NaiveDate) -> Result<Vec<Task>> {
        let Some(text) = read_if_exists(&self.tasks_path)? else {
            return Ok(Vec::new());
        };
        let tasks = decode_tasks(&text, today);
        tracing::debug!(path = %self.tasks_path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    pub fn save_sessions(&self, sessions: &[PomodoroSession]) -> Result<()> {
        let text = encode_sessions(sessions);
        lock::write_atomic_locked(&self.sessions_path, text.as_bytes(), self.lock_timeout_ms)?;
        tracing::debug!(
            path = %self.sessions_path.display(),
            count = sessions.len(),
            "saved sessions"
        );
        Ok(())
    }

    /// Load the session collection. A missing file is an empty collection.
    pub fn load_sessions(&self) -> Result<Vec<PomodoroSession>> {
        let Some(text) = read_if_exists(&self.sessions_path)? else {
            return Ok(Vec::new());
        };
        let sessions = decode_sessions(&text);
        tracing::debug!(
            path = %self.sessions_path.display(),
            count = sessions.len(),
            "loaded sessions"
        );
        Ok(sessions)
    }
}

/// Invalid UTF-8 is replaced rather than rejected so one bad byte does not
/// drop the whole collection.
fn read_if_exists(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path)?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

// =========================================================================
// Record mapping
// =========================================================================

pub fn task_to_value(task: &Task) -> Value {
    Value::object([
        ("id", Value::from(&task.id)),
        ("title", Value::from(&task.title)),
        ("due", Value::from(&task.due)),
        ("completed", Value::from(task.completed)),
        ("tags", Value::from(&task.tags)),
    ])
}

pub fn session_to_value(session: &PomodoroSession) -> Value {
    Value::object([
        ("id", Value::from(&session.id)),
        ("taskId", Value::from(&session.task_id)),
        ("start", Value::from(&session.start)),
        ("end", Value::from(&session.end)),
        ("completed", Value::from(session.completed)),
    ])
}

pub fn encode_tasks(tasks: &[Task]) -> String {
    codec::encode(&Value::List(tasks.iter().map(task_to_value).collect()))
}

pub fn encode_sessions(sessions: &[PomodoroSession]) -> String {
    codec::encode(&Value::List(sessions.iter().map(session_to_value).collect()))
}

pub fn decode_tasks(text: &str, today: NaiveDate) -> Vec<Task> {
    codec::decode_flat_list(text)
        .iter()
        .map(|fields| task_from_fields(fields, today))
        .collect()
}

pub fn decode_sessions(text: &str) -> Vec<PomodoroSession> {
    codec::decode_flat_list(text)
        .iter()
        .map(session_from_fields)
        .collect()
}

/// Rebuild a task from decoded fields.
///
/// Only absent keys take defaults; a present but empty value is kept.
pub fn task_from_fields(fields: &FlatRecord, today: NaiveDate) -> Task {
    Task {
        id: field_or_else(fields, "id", new_id),
        title: field_or_else(fields, "title", || DEFAULT_TITLE.to_string()),
        due: field_or_else(fields, "due", || format_date(today)),
        completed: fields.get("completed").is_some_and(|v| parse_flag(v)),
        tags: field_or_else(fields, "tags", String::new),
    }
}

/// Rebuild a session from decoded fields.
pub fn session_from_fields(fields: &FlatRecord) -> PomodoroSession {
    PomodoroSession {
        id: field_or_else(fields, "id", new_id),
        task_id: field_or_else(fields, "taskId", String::new),
        start: field_or_else(fields, "start", String::new),
        end: field_or_else(fields, "end", String::new),
        completed: fields.get("completed").is_some_and(|v| parse_flag(v)),
    }
}

/// Fresh record id (UUID v4).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn field_or_else(fields: &FlatRecord, key: &str, default: impl FnOnce() -> String) -> String {
    fields.get(key).cloned().unwrap_or_else(default)
}

/// `true` in any letter case; everything else is false.
fn parse_flag(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}
