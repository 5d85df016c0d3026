//! In-memory task and session collections with write-through persistence.
//!
//! Each collection sits behind its own mutex. A mutating operation holds
//! that mutex across the change and the save that follows, so the file on
//! disk always reflects a prefix of the operations applied to it. Task and
//! session operations never block each other.
//!
//! Nothing here returns an error to the caller: unknown ids are no-ops,
//! unparsable due dates fall into the low-priority bucket, and persistence
//! failures are logged and the in-memory state carries on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{format_instant, Clock};
use crate::config::{Config, PriorityConfig};
use crate::persist::{self, Persistence};
use crate::session::{PomodoroSession, SessionStats};
use crate::task::{sort_tasks, ListQuery, SortMode, Task, TaskView};

/// Shared application state.
pub struct Store {
    tasks: Mutex<Vec<Task>>,
    sessions: Mutex<Vec<PomodoroSession>>,
    persistence: Option<Persistence>,
    clock: Arc<dyn Clock>,
    priority: PriorityConfig,
    save_failures: AtomicUsize,
}

impl Store {
    /// Empty store that never touches disk.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
            persistence: None,
            clock,
            priority: PriorityConfig::default(),
            save_failures: AtomicUsize::new(0),
        }
    }

    /// Store backed by `persistence`, loaded from whatever is on disk.
    ///
    /// A collection that fails to load starts empty; the failure is logged.
    pub fn open(persistence: Persistence, clock: Arc<dyn Clock>) -> Self {
        let tasks = persistence
            .load_tasks(clock.today())
            .unwrap_or_else(|err| {
                tracing::warn!(
                    path = %persistence.tasks_path().display(),
                    error = %err,
                    "failed to load tasks"
                );
                Vec::new()
            });
        let sessions = persistence.load_sessions().unwrap_or_else(|err| {
            tracing::warn!(
                path = %persistence.sessions_path().display(),
                error = %err,
                "failed to load sessions"
            );
            Vec::new()
        });

        Self {
            tasks: Mutex::new(tasks),
            sessions: Mutex::new(sessions),
            persistence: Some(persistence),
            clock,
            priority: PriorityConfig::default(),
            save_failures: AtomicUsize::new(0),
        }
    }

    /// Open the store described by `config` under `data_dir`.
    pub fn from_config(config: &Config, data_dir: &std::path::Path, clock: Arc<dyn Clock>) -> Self {
        Self::open(Persistence::from_config(config, data_dir), clock)
            .with_priority(config.priority)
    }

    pub fn with_priority(mut self, priority: PriorityConfig) -> Self {
        self.priority = priority;
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Number of saves that failed since the store was opened.
    pub fn save_failures(&self) -> usize {
        self.save_failures.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Append a new incomplete task and return its id.
    ///
    /// `due` is stored verbatim; an unparsable value only affects the
    /// derived priority.
    pub fn add_task(&self, title: &str, due: &str, tags: &str) -> String {
        let id = persist::new_id();
        let mut tasks = self.lock_tasks();
        tasks.push(Task::new(id.clone(), title, due, tags));
        self.save_tasks(&tasks);
        id
    }

    /// Update the first task with `id`.
    ///
    /// Empty `title` or `due` leave the stored value alone; `tags` always
    /// replaces. Returns whether a task matched.
    pub fn edit_task(&self, id: &str, title: &str, due: &str, tags: &str) -> bool {
        let mut tasks = self.lock_tasks();
        let matched = match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                if !title.is_empty() {
                    task.title = title.to_string();
                }
                if !due.is_empty() {
                    task.due = due.to_string();
                }
                task.tags = tags.to_string();
                true
            }
            None => false,
        };
        self.save_tasks(&tasks);
        matched
    }

    /// Remove every task with `id`. Returns how many were removed.
    pub fn delete_task(&self, id: &str) -> usize {
        let mut tasks = self.lock_tasks();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let removed = before - tasks.len();
        self.save_tasks(&tasks);
        removed
    }

    /// Flip `completed` on the first task with `id`; returns the new state.
    pub fn toggle_complete(&self, id: &str) -> Option<bool> {
        let mut tasks = self.lock_tasks();
        let state = tasks.iter_mut().find(|task| task.id == id).map(|task| {
            task.completed = !task.completed;
            task.completed
        });
        self.save_tasks(&tasks);
        state
    }

    /// All tasks, most urgent first.
    pub fn list_tasks(&self) -> Vec<TaskView> {
        let mut views = self.task_snapshots();
        sort_tasks(&mut views, SortMode::Priority);
        views
    }

    /// Tasks filtered and ordered by `query`.
    pub fn query_tasks(&self, query: &ListQuery) -> Vec<TaskView> {
        query.apply(self.task_snapshots())
    }

    /// All tasks in insertion order with freshly derived fields.
    pub fn task_snapshots(&self) -> Vec<TaskView> {
        let today = self.clock.today();
        self.lock_tasks()
            .iter()
            .map(|task| task.view(today, &self.priority))
            .collect()
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Start a session for `task_id` (not validated) and return its id.
    pub fn start_session(&self, task_id: &str) -> String {
        let id = persist::new_id();
        let start = format_instant(self.clock.now());
        let mut sessions = self.lock_sessions();
        sessions.push(PomodoroSession::start(id.clone(), task_id, start));
        self.save_sessions(&sessions);
        id
    }

    /// Stop the first session with `session_id`. Returns whether one matched.
    pub fn stop_session(&self, session_id: &str) -> bool {
        let end = format_instant(self.clock.now());
        let mut sessions = self.lock_sessions();
        let matched = match sessions.iter_mut().find(|s| s.id == session_id) {
            Some(session) => {
                session.stop(end);
                true
            }
            None => false,
        };
        self.save_sessions(&sessions);
        matched
    }

    /// All sessions in insertion order.
    pub fn list_sessions(&self) -> Vec<PomodoroSession> {
        self.lock_sessions().clone()
    }

    pub fn session_stats(&self) -> SessionStats {
        SessionStats::of(&self.lock_sessions())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_sessions(&self) -> MutexGuard<'_, Vec<PomodoroSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save_tasks(&self, tasks: &[Task]) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if let Err(err) = persistence.save_tasks(tasks) {
            self.save_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                path = %persistence.tasks_path().display(),
                error = %err,
                "failed to save tasks"
            );
        }
    }

    fn save_sessions(&self, sessions: &[PomodoroSession]) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if let Err(err) = persistence.save_sessions(sessions) {
            self.save_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                path = %persistence.sessions_path().display(),
                error = %err,
                "failed to save sessions"
            );
        }
    }
}
