//! pomo init command implementation
//!
//! Creates the data directory and writes a default `pomo.toml`.

use std::path::{Path, PathBuf};

use crate::cli::GlobalOptions;
use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};

pub struct InitOptions {
    pub force: bool,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    data_dir: PathBuf,
    config: PathBuf,
    tasks_file: PathBuf,
    sessions_file: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    data_dir: bool,
    config: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let data_dir = options.global.resolve_data_dir()?;
    let config_path = options
        .global
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE));

    let created_data_dir = ensure_dir(&data_dir)?;
    let created_config = ensure_config(&config_path, options.force)?;
    let config = Config::load(&config_path)?;

    let report = InitReport {
        data_dir: data_dir.clone(),
        config: config_path.clone(),
        tasks_file: config.tasks_path(&data_dir),
        sessions_file: config.sessions_path(&data_dir),
        created: InitCreated {
            data_dir: created_data_dir,
            config: created_config,
        },
    };

    let header = if created_data_dir || created_config {
        "pomo init: initialized"
    } else {
        "pomo init: nothing to do"
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("data dir", data_dir.display().to_string());
    human.push_summary(
        "config",
        format!(
            "{}{}",
            config_path.display(),
            if created_config { " (written)" } else { "" }
        ),
    );
    human.push_next_step("pomo task add \"<title>\" --due YYYY-MM-DD");

    emit_success(options.global.output(), "init", &report, Some(&human))
}

fn ensure_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() {
        if !path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{} exists but is not a file",
                path.display()
            )));
        }
        if !force {
            return Ok(false);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Config::default().save(path)?;
    tracing::info!(path = %path.display(), "wrote default config");
    Ok(true)
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::OperationFailed(format!(
                "Expected directory at {}",
                path.display()
            )));
        }
        return Ok(false);
    }

    std::fs::create_dir_all(path)?;
    Ok(true)
}
