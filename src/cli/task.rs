//! pomo task command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{load_context, GlobalOptions};
use crate::clock::format_date;
use crate::error::Result;
use crate::export::tasks_to_csv;
use crate::lock::write_atomic;
use crate::output::{emit_success, HumanOutput};
use crate::task::{validate_due, ListQuery, SortMode, TaskSummary, TaskView, UNPARSABLE_DAYS_LEFT};

pub struct AddOptions {
    pub title: String,
    pub due: Option<String>,
    pub tags: String,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: String,
    pub due: String,
    pub tags: String,
    pub global: GlobalOptions,
}

pub struct IdOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct ListOptions {
    pub search: Option<String>,
    pub sort: String,
    pub global: GlobalOptions,
}

pub struct ExportOptions {
    pub output: Option<PathBuf>,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct TaskAddedOutput {
    id: String,
    task: Option<TaskView>,
}

#[derive(Serialize)]
struct TaskEditedOutput {
    id: String,
    found: bool,
    task: Option<TaskView>,
}

#[derive(Serialize)]
struct TaskRemovedOutput {
    id: String,
    removed: usize,
}

#[derive(Serialize)]
struct TaskToggledOutput {
    id: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

#[derive(Serialize)]
struct TaskListOutput {
    summary: TaskSummary,
    tasks: Vec<TaskView>,
}

#[derive(Serialize)]
struct TaskExportOutput {
    tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    csv: Option<String>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    if let Some(due) = options.due.as_deref() {
        validate_due(due)?;
    }

    let ctx = load_context(&options.global, true)?;
    let due = options
        .due
        .unwrap_or_else(|| format_date(ctx.store.clock().today()));
    let id = ctx.store.add_task(&options.title, &due, &options.tags);
    let task = find_task(&ctx.store.task_snapshots(), &id);

    let mut human = HumanOutput::new("Task added");
    human.push_summary("ID", id.clone());
    if let Some(task) = task.as_ref() {
        human.push_summary("Title", task.title.clone());
        human.push_summary("Due", task.due.clone());
        human.push_summary("Priority", describe_priority(task));
    }
    human.push_next_step(format!("pomo session start {id}"));

    ctx.warn_unsaved(&mut human);

    emit_success(
        options.global.output(),
        "task add",
        &TaskAddedOutput { id, task },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    validate_due(&options.due)?;

    let ctx = load_context(&options.global, true)?;
    let found = ctx
        .store
        .edit_task(&options.id, &options.title, &options.due, &options.tags);
    let task = find_task(&ctx.store.task_snapshots(), &options.id);

    let mut human = HumanOutput::new(if found {
        "Task updated"
    } else {
        "Task not found; nothing changed"
    });
    human.push_summary("ID", options.id.clone());
    if let Some(task) = task.as_ref() {
        human.push_summary("Title", task.title.clone());
        human.push_summary("Due", task.due.clone());
        human.push_summary("Tags", task.tags.clone());
        human.push_summary("Priority", describe_priority(task));
    }

    ctx.warn_unsaved(&mut human);

    emit_success(
        options.global.output(),
        "task edit",
        &TaskEditedOutput {
            id: options.id,
            found,
            task,
        },
        Some(&human),
    )
}

pub fn run_rm(options: IdOptions) -> Result<()> {
    let ctx = load_context(&options.global, true)?;
    let removed = ctx.store.delete_task(&options.id);

    let mut human = HumanOutput::new(if removed > 0 {
        "Task deleted"
    } else {
        "Task not found; nothing changed"
    });
    human.push_summary("ID", options.id.clone());
    human.push_summary("Removed", removed.to_string());

    ctx.warn_unsaved(&mut human);

    emit_success(
        options.global.output(),
        "task rm",
        &TaskRemovedOutput {
            id: options.id,
            removed,
        },
        Some(&human),
    )
}

pub fn run_toggle(options: IdOptions) -> Result<()> {
    let ctx = load_context(&options.global, true)?;
    let completed = ctx.store.toggle_complete(&options.id);

    let header = match completed {
        Some(true) => "Task completed",
        Some(false) => "Task reopened",
        None => "Task not found; nothing changed",
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", options.id.clone());

    ctx.warn_unsaved(&mut human);

    emit_success(
        options.global.output(),
        "task toggle",
        &TaskToggledOutput {
            id: options.id,
            found: completed.is_some(),
            completed,
        },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let sort: SortMode = options.sort.parse()?;
    let ctx = load_context(&options.global, false)?;
    let query = ListQuery {
        search: options.search,
        sort,
    };
    let tasks = ctx.store.query_tasks(&query);
    let summary = TaskSummary::of(&tasks);

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", summary.total.to_string());
    human.push_summary("Completed", summary.completed.to_string());
    if let Some(search) = query.search.as_deref() {
        human.push_summary("Search", search.to_string());
    }
    for task in &tasks {
        let mark = if task.completed { "x" } else { " " };
        let mut line = format!(
            "[{mark}][{}] {} {} (due {}, {})",
            task.priority,
            task.id,
            task.title,
            if task.due.is_empty() { "-" } else { task.due.as_str() },
            describe_days_left(task.days_left)
        );
        if !task.tags.is_empty() {
            line.push_str(&format!(" #{}", task.tags));
        }
        human.push_detail(line);
    }
    if tasks.is_empty() && query.search.is_none() {
        human.push_next_step("pomo task add \"<title>\" --due YYYY-MM-DD");
    }

    emit_success(
        options.global.output(),
        "task list",
        &TaskListOutput { summary, tasks },
        Some(&human),
    )
}

pub fn run_export(options: ExportOptions) -> Result<()> {
    let ctx = load_context(&options.global, false)?;
    let tasks = ctx.store.task_snapshots();
    let csv = tasks_to_csv(&tasks);

    match options.output {
        Some(path) => {
            write_atomic(&path, csv.as_bytes())?;
            tracing::info!(path = %path.display(), tasks = tasks.len(), "exported tasks");

            let mut human = HumanOutput::new("Tasks exported");
            human.push_summary("Tasks", tasks.len().to_string());
            human.push_summary("File", path.display().to_string());
            emit_success(
                options.global.output(),
                "task export",
                &TaskExportOutput {
                    tasks: tasks.len(),
                    path: Some(path),
                    csv: None,
                },
                Some(&human),
            )
        }
        None if options.global.json => emit_success(
            options.global.output(),
            "task export",
            &TaskExportOutput {
                tasks: tasks.len(),
                path: None,
                csv: Some(csv),
            },
            None,
        ),
        None => {
            print!("{csv}");
            Ok(())
        }
    }
}

fn find_task(tasks: &[TaskView], id: &str) -> Option<TaskView> {
    tasks.iter().find(|task| task.id == id).cloned()
}

fn describe_priority(task: &TaskView) -> String {
    format!("{} ({})", task.priority, describe_days_left(task.days_left))
}

fn describe_days_left(days_left: i64) -> String {
    match days_left {
        UNPARSABLE_DAYS_LEFT => "no valid due date".to_string(),
        0 => "due today".to_string(),
        1 => "1 day left".to_string(),
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d => format!("{d} days left"),
    }
}
