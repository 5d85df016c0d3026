#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{Duration, Local};
use serde_json::Value;
use tempfile::TempDir;

/// Scratch data directory for one test.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.file(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_file(&self, name: &str) -> std::io::Result<String> {
        fs::read_to_string(self.file(name))
    }

    /// `pomo` pointed at this data directory with a clean environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = pomo_cmd();
        cmd.env("POMO_DATA_DIR", self.path());
        cmd
    }

    /// Run with `--json`, assert success and return the `data` payload.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(value["schema_version"], "pomo.v1");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }

    pub fn add_task(&self, title: &str, due: &str, tags: &str) -> String {
        let data = self.json(&["task", "add", title, "--due", due, "--tags", tags]);
        data["id"].as_str().expect("task id").to_string()
    }
}

pub fn pomo_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pomo").expect("binary");
    cmd.env_remove("POMO_DATA_DIR")
        .env_remove("POMO_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Local date `days` from today, formatted `YYYY-MM-DD`.
pub fn date_from_today(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
