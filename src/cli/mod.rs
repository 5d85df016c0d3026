//! Command-line interface for pomo
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::clock::SystemClock;
use crate::config::{default_data_dir, Config};
use crate::error::Result;
use crate::lock::FileLock;
use crate::output::HumanOutput;
use crate::store::Store;

mod init;
mod session;
mod task;

/// Name of the lock file held by mutating commands
pub const COMMAND_LOCK_FILE: &str = "pomo.lock";

/// pomo - tasks with due-date urgency and pomodoro sessions
#[derive(Parser, Debug)]
#[command(name = "pomo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding tasks.json, sessions.json and pomo.toml
    #[arg(long, global = true, env = "POMO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/pomo.toml)
    #[arg(long, global = true, env = "POMO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and a default pomo.toml
    Init {
        /// Overwrite an existing pomo.toml with defaults
        #[arg(long)]
        force: bool,
    },

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Pomodoro sessions
    #[command(subcommand)]
    Session(SessionCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Due date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        due: Option<String>,

        /// Free-form tags, e.g. "work,q3"
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Edit a task; omitted title/due are left unchanged, tags are replaced
    Edit {
        /// Task ID
        id: String,

        #[arg(long, default_value = "")]
        title: String,

        /// Due date as YYYY-MM-DD
        #[arg(long, default_value = "")]
        due: String,

        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Delete a task
    #[command(visible_alias = "delete")]
    Rm {
        /// Task ID
        id: String,
    },

    /// Flip a task between open and completed
    Toggle {
        /// Task ID
        id: String,
    },

    /// List tasks, most urgent first
    #[command(visible_alias = "ls")]
    List {
        /// Case-insensitive match against title and tags
        #[arg(long)]
        search: Option<String>,

        /// Sort order: priority, due, title
        #[arg(long, default_value = "priority")]
        sort: String,
    },

    /// Export all tasks as CSV
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Start a pomodoro session for a task
    Start {
        /// Task ID (not checked against existing tasks)
        task_id: String,
    },

    /// Stop a running session
    Stop {
        /// Session ID
        session_id: String,
    },

    /// List sessions in start order
    List,

    /// Session counts per task
    Stats,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            data_dir: self.data_dir,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init { force } => init::run(init::InitOptions { force, global }),
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add { title, due, tags } => task::run_add(task::AddOptions {
                    title,
                    due,
                    tags,
                    global,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    due,
                    tags,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    due,
                    tags,
                    global,
                }),
                TaskCommands::Rm { id } => task::run_rm(task::IdOptions { id, global }),
                TaskCommands::Toggle { id } => task::run_toggle(task::IdOptions { id, global }),
                TaskCommands::List { search, sort } => task::run_list(task::ListOptions {
                    search,
                    sort,
                    global,
                }),
                TaskCommands::Export { output } => {
                    task::run_export(task::ExportOptions { output, global })
                }
            },
            Commands::Session(cmd) => match cmd {
                SessionCommands::Start { task_id } => {
                    session::run_start(session::StartOptions { task_id, global })
                }
                SessionCommands::Stop { session_id } => {
                    session::run_stop(session::StopOptions { session_id, global })
                }
                SessionCommands::List => session::run_list(global),
                SessionCommands::Stats => session::run_stats(global),
            },
        }
    }
}

/// Flags shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn output(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    /// Explicit `--config` must load cleanly; the implicit one falls back
    /// to defaults.
    pub fn load_config(&self, data_dir: &Path) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path),
            None => Ok(Config::load_from_dir(data_dir)),
        }
    }
}

/// Everything a task or session command needs
pub(crate) struct CommandContext {
    pub store: Store,
    pub config: Config,
    _lock: Option<FileLock>,
}

/// Open the store. Mutating commands hold `pomo.lock` until the context
/// drops so concurrent invocations do not interleave their writes.
pub(crate) fn load_context(global: &GlobalOptions, mutating: bool) -> Result<CommandContext> {
    let data_dir = global.resolve_data_dir()?;
    let config = global.load_config(&data_dir)?;

    let lock = if mutating {
        Some(FileLock::acquire(
            data_dir.join(COMMAND_LOCK_FILE),
            config.storage.lock_timeout_ms,
        )?)
    } else {
        None
    };

    let store = Store::from_config(&config, &data_dir, Arc::new(SystemClock));
    tracing::debug!(data_dir = %data_dir.display(), mutating, "opened store");

    Ok(CommandContext {
        store,
        config,
        _lock: lock,
    })
}

impl CommandContext {
    /// Flag changes that stayed in memory because a save failed.
    pub fn warn_unsaved(&self, human: &mut HumanOutput) {
        let failures = self.store.save_failures();
        if failures > 0 {
            human.push_warning(format!(
                "{failures} save(s) failed; changes were not written to disk"
            ));
        }
    }
}
