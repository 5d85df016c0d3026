mod support;

use predicates::str::contains;

use support::{date_from_today, TestData};

#[test]
fn init_writes_default_config() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    let nested = data.file("nested/pomo");
    let nested_arg = nested.to_string_lossy().to_string();

    let report = support::pomo_cmd()
        .args(["--data-dir", &nested_arg, "init", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&report)?;
    assert_eq!(report["command"], "init");
    assert_eq!(report["data"]["created"]["data_dir"], true);
    assert_eq!(report["data"]["created"]["config"], true);

    let written = std::fs::read_to_string(nested.join("pomo.toml"))?;
    assert!(written.contains("high_within_days = 3"));
    assert!(written.contains("duration_minutes = 25"));

    support::pomo_cmd()
        .args(["--data-dir", &nested_arg, "init"])
        .assert()
        .success()
        .stdout(contains("nothing to do"));
    Ok(())
}

#[test]
fn priority_thresholds_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_file(
        "pomo.toml",
        "[priority]\nhigh_within_days = 0\nmedium_within_days = 1\n",
    )?;

    let added = data.json(&["task", "add", "Soon", "--due", &date_from_today(2)]);
    assert_eq!(added["task"]["priority"], "Low");

    let added = data.json(&["task", "add", "Tomorrow", "--due", &date_from_today(1)]);
    assert_eq!(added["task"]["priority"], "Medium");
    Ok(())
}

#[test]
fn custom_file_names_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_file(
        "pomo.toml",
        "[storage]\ntasks_file = \"todo.json\"\nsessions_file = \"focus.json\"\n",
    )?;

    let id = data.add_task("Named", &date_from_today(4), "");
    data.json(&["session", "start", &id]);

    assert!(data.file("todo.json").exists());
    assert!(data.file("focus.json").exists());
    assert!(!data.file("tasks.json").exists());
    Ok(())
}

#[test]
fn explicit_invalid_config_is_user_error() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    let config = data.write_file("bad.toml", "[pomodoro]\nduration_minutes = 0\n")?;

    data.cmd()
        .env("POMO_CONFIG", &config)
        .args(["task", "list"])
        .assert()
        .code(2)
        .stderr(contains("Invalid configuration"));

    let output = data
        .cmd()
        .env("POMO_CONFIG", &config)
        .args(["task", "list", "--json"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let envelope: serde_json::Value = serde_json::from_slice(&output)?;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "task list");
    assert_eq!(envelope["error"]["kind"], "user_error");
    assert_eq!(envelope["error"]["code"], 2);
    Ok(())
}

#[test]
fn implicit_invalid_config_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_file("pomo.toml", "this is not toml = = =")?;

    let added = data.json(&["task", "add", "Still works", "--due", &date_from_today(2)]);
    assert_eq!(added["task"]["priority"], "High");
    Ok(())
}
