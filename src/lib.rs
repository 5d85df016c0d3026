//! pomo - Task Tracker Library
//!
//! Core functionality for the pomo CLI: tasks whose urgency is derived from
//! their due date, and pomodoro work sessions attributed to tasks.
//!
//! # Core Concepts
//!
//! - **Tasks**: title, due date, tags and a completion flag
//! - **Priority**: High/Medium/Low and days-left, recomputed on every read
//! - **Sessions**: start/stop work intervals counted per task
//! - **Persistence**: two flat JSON files rewritten in full on every change
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `clock`: Injectable source of "today" and "now"
//! - `codec`: Minimal JSON encoder and lenient flat-list decoder
//! - `config`: Configuration loading from `pomo.toml`
//! - `error`: Error types and result aliases
//! - `export`: CSV rendering of task snapshots
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON output envelopes
//! - `persist`: Backing files for the task and session collections
//! - `session`: Pomodoro session records and stats
//! - `store`: Thread-safe in-memory collections with write-through saves
//! - `task`: Task records, derived priority and ordering

pub mod cli;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod lock;
pub mod output;
pub mod persist;
pub mod session;
pub mod store;
pub mod task;

pub use error::{Error, Result};
pub use store::Store;
