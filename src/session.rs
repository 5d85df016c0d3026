//! Pomodoro work sessions.

use std::collections::BTreeMap;

use serde::Serialize;

/// One work interval attributed to a task.
///
/// `task_id` is not checked against the task collection; sessions may
/// reference tasks that never existed or were since deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSession {
    pub id: String,
    pub task_id: String,
    /// RFC 3339 UTC instant the session started
    pub start: String,
    /// RFC 3339 UTC instant the session was stopped; empty while running
    pub end: String,
    pub completed: bool,
}

impl PomodoroSession {
    pub fn start(id: impl Into<String>, task_id: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            start: start.into(),
            end: String::new(),
            completed: false,
        }
    }

    /// Stamp the end time and mark completed.
    ///
    /// Stopping an already completed session overwrites `end` again.
    pub fn stop(&mut self, end: impl Into<String>) {
        self.end = end.into();
        self.completed = true;
    }

    pub fn is_running(&self) -> bool {
        !self.completed
    }
}

/// Session counts, running sessions included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: usize,
    /// Sessions per task id; only ids with at least one session appear
    pub per_task: BTreeMap<String, usize>,
}

impl SessionStats {
    pub fn of(sessions: &[PomodoroSession]) -> Self {
        let mut per_task = BTreeMap::new();
        for session in sessions {
            *per_task.entry(session.task_id.clone()).or_insert(0) += 1;
        }
        Self {
            total_sessions: sessions.len(),
            per_task,
        }
    }
}
