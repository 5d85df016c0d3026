//! pomo session command implementations.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::cli::{load_context, GlobalOptions};
use crate::clock::format_instant;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::session::{PomodoroSession, SessionStats};

pub struct StartOptions {
    pub task_id: String,
    pub global: GlobalOptions,
}

pub struct StopOptions {
    pub session_id: String,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionStartedOutput {
    id: String,
    task_id: String,
    start: String,
    /// Suggested stop time given the configured pomodoro length
    ends_at: String,
}

#[derive(Serialize)]
struct SessionStoppedOutput {
    id: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<PomodoroSession>,
}

#[derive(Serialize)]
struct SessionListOutput {
    total: usize,
    running: usize,
    sessions: Vec<PomodoroSession>,
}

pub fn run_start(options: StartOptions) -> Result<()> {
    let ctx = load_context(&options.global, true)?;
    let id = ctx.store.start_session(&options.task_id);
    let session = ctx
        .store
        .list_sessions()
        .into_iter()
        .find(|session| session.id == id);
    let start = session
        .map(|session| session.start)
        .unwrap_or_else(|| format_instant(ctx.store.clock().now()));

    let minutes = ctx.config.pomodoro.duration_minutes;
    let ends_at = DateTime::parse_from_rfc3339(&start)
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|_| ctx.store.clock().now())
        + Duration::minutes(i64::from(minutes));
    let ends_at = format_instant(ends_at);

    let mut human = HumanOutput::new("Session started");
    human.push_summary("ID", id.clone());
    human.push_summary("Task", options.task_id.clone());
    human.push_summary("Started", start.clone());
    human.push_summary("Length", format!("{minutes} min (until {ends_at})"));
    human.push_next_step(format!("pomo session stop {id}"));

    ctx.warn_unsaved(&mut human);

    emit_success(
        options.global.output(),
        "session start",
        &SessionStartedOutput {
            id,
            task_id: options.task_id,
            start,
            ends_at,
        },
        Some(&human),
    )
}

pub fn run_stop(options: StopOptions) -> Result<()> {
    let ctx = load_context(&options.global, true)?;
    let found = ctx.store.stop_session(&options.session_id);
    let session = ctx
        .store
        .list_sessions()
        .into_iter()
        .find(|session| session.id == options.session_id);

    let mut human = HumanOutput::new(if found {
        "Session stopped"
    } else {
        "Session not found; nothing changed"
    });
    human.push_summary("ID", options.session_id.clone());
    if let Some(session) = session.as_ref() {
        human.push_summary("Task", session.task_id.clone());
        human.push_summary("Started", session.start.clone());
        human.push_summary("Ended", session.end.clone());
    }

    ctx.warn_unsaved(&mut human);

    emit_success(
        options.global.output(),
        "session stop",
        &SessionStoppedOutput {
            id: options.session_id,
            found,
            session,
        },
        Some(&human),
    )
}

pub fn run_list(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global, false)?;
    let sessions = ctx.store.list_sessions();
    let running = sessions.iter().filter(|s| s.is_running()).count();

    let mut human = HumanOutput::new("Sessions");
    human.push_summary("Total", sessions.len().to_string());
    human.push_summary("Running", running.to_string());
    for session in &sessions {
        let end = if session.is_running() {
            "running"
        } else {
            session.end.as_str()
        };
        human.push_detail(format!(
            "{} task {} {} -> {}",
            session.id, session.task_id, session.start, end
        ));
    }

    emit_success(
        global.output(),
        "session list",
        &SessionListOutput {
            total: sessions.len(),
            running,
            sessions,
        },
        Some(&human),
    )
}

pub fn run_stats(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global, false)?;
    let stats: SessionStats = ctx.store.session_stats();

    let mut human = HumanOutput::new("Session stats");
    human.push_summary("Total sessions", stats.total_sessions.to_string());
    for (task_id, count) in &stats.per_task {
        human.push_detail(format!("{task_id}: {count}"));
    }

    emit_success(global.output(), "session stats", &stats, Some(&human))
}
