//! Configuration loading and management
//!
//! Handles parsing of `pomo.toml` configuration files. Every key is optional;
//! a missing file yields the defaults.
//!
//! ```toml
//! [storage]
//! tasks_file = "tasks.json"
//! sessions_file = "sessions.json"
//! lock_timeout_ms = 5000
//!
//! [priority]
//! high_within_days = 3
//! medium_within_days = 7
//!
//! [pomodoro]
//! duration_minutes = 25
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::lock::DEFAULT_LOCK_TIMEOUT_MS;

/// Name of the config file inside the data directory
pub const CONFIG_FILE: &str = "pomo.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backing file configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Due-date urgency thresholds
    #[serde(default)]
    pub priority: PriorityConfig,

    /// Pomodoro timer settings
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
}

/// Backing file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Task collection file, relative to the data directory
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    /// Session collection file, relative to the data directory
    #[serde(default = "default_sessions_file")]
    pub sessions_file: String,

    /// How long a save waits for the file lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_tasks_file() -> String {
    "tasks.json".to_string()
}

fn default_sessions_file() -> String {
    "sessions.json".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            sessions_file: default_sessions_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Due-date urgency thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Tasks due within this many days (or overdue) are High
    #[serde(default = "default_high_within_days")]
    pub high_within_days: i64,

    /// Tasks due within this many days are Medium
    #[serde(default = "default_medium_within_days")]
    pub medium_within_days: i64,
}

fn default_high_within_days() -> i64 {
    3
}

fn default_medium_within_days() -> i64 {
    7
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            high_within_days: default_high_within_days(),
            medium_within_days: default_medium_within_days(),
        }
    }
}

/// Pomodoro timer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Length of one work session
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
}

fn default_duration_minutes() -> u32 {
    25
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration_minutes(),
        }
    }
}

impl Config {
    /// Load configuration from a `pomo.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `pomo.toml` from the data directory, or return defaults
    ///
    /// An unreadable or invalid file is reported and replaced by defaults.
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Absolute path of the task collection file
    pub fn tasks_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.storage.tasks_file)
    }

    /// Absolute path of the session collection file
    pub fn sessions_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.storage.sessions_file)
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.storage.validate()?;
        self.priority.validate()?;
        if self.pomodoro.duration_minutes == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "pomodoro.duration_minutes must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> crate::error::Result<()> {
        for (field, value) in [
            ("storage.tasks_file", &self.tasks_file),
            ("storage.sessions_file", &self.sessions_file),
        ] {
            if value.trim().is_empty() {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "{field} cannot be empty"
                )));
            }
        }
        if self.tasks_file == self.sessions_file {
            return Err(crate::error::Error::InvalidConfig(
                "storage.tasks_file and storage.sessions_file must differ".to_string(),
            ));
        }
        Ok(())
    }
}

impl PriorityConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.high_within_days > self.medium_within_days {
            return Err(crate::error::Error::InvalidConfig(format!(
                "priority.high_within_days ({}) must not exceed priority.medium_within_days ({})",
                self.high_within_days, self.medium_within_days
            )));
        }
        Ok(())
    }
}

/// Default data directory (`~/.local/share/pomo` or platform equivalent)
pub fn default_data_dir() -> crate::error::Result<PathBuf> {
    directories::ProjectDirs::from("", "", "pomo")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            crate::error::Error::InvalidConfig(
                "could not determine a data directory; pass --data-dir".to_string(),
            )
        })
}
