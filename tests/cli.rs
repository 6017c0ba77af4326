use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn tp(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tp").expect("binary");
    cmd.current_dir(dir.path())
        .env_remove("DEFAULT_PRIORITY")
        .env_remove("DEFAULT_SUBTASKS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_tasks(dir: &TempDir, json: &str) {
    let tasks = dir.path().join("tasks");
    fs::create_dir_all(&tasks).unwrap();
    fs::write(tasks.join("tasks.json"), json).unwrap();
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("schedule"))
        .stdout(contains("analyze-complexity"));
}

#[test]
fn init_then_add_assigns_sequential_ids() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Created empty task list"));
    tp(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already exists"));

    tp(&dir)
        .args(["add", "Set up CI", "--priority", "high", "--hours", "3"])
        .assert()
        .success()
        .stdout(contains("Added task 1"));
    tp(&dir)
        .args(["add", "Deploy", "--depends-on", "1", "--due", "2030-01-15"])
        .assert()
        .success()
        .stdout(contains("Added task 2"));

    let tasks = read_json(&dir.path().join("tasks/tasks.json"));
    assert_eq!(tasks[0]["priority"], "high");
    assert_eq!(tasks[0]["estimatedHours"], 3.0);
    assert_eq!(tasks[1]["dependencies"][0], 1);
    assert_eq!(tasks[1]["dueDate"], "2030-01-15");
    assert_eq!(tasks[1]["status"], "pending");
}

#[test]
fn file_flag_overrides_default_location() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("elsewhere.json");
    tp(&dir)
        .arg("--file")
        .arg(&file)
        .args(["add", "Write docs"])
        .assert()
        .success();
    assert!(file.exists());
    assert!(!dir.path().join("tasks/tasks.json").exists());
}

#[test]
fn next_picks_ready_high_priority_task() {
    let dir = TempDir::new().unwrap();
    write_tasks(
        &dir,
        r#"[
            {"id": 1, "title": "Low", "status": "pending", "priority": "low", "dependencies": []},
            {"id": 2, "title": "Blocked", "status": "pending", "priority": "critical", "dependencies": [3]},
            {"id": 3, "title": "Urgent", "status": "pending", "priority": "high", "dependencies": []}
        ]"#,
    );
    tp(&dir)
        .arg("next")
        .assert()
        .success()
        .stdout(contains("Task #3: Urgent"))
        .stdout(contains("tp set-status 3 in_progress"));
}

#[test]
fn next_reports_all_complete() {
    let dir = TempDir::new().unwrap();
    write_tasks(&dir, r#"[{"id": 1, "title": "Done", "status": "completed"}]"#);
    tp(&dir)
        .arg("next")
        .assert()
        .success()
        .stdout(contains("every task is complete"));
}

#[test]
fn dependency_cycle_is_refused() {
    let dir = TempDir::new().unwrap();
    write_tasks(
        &dir,
        r#"[
            {"id": 1, "title": "A", "dependencies": [2]},
            {"id": 2, "title": "B", "dependencies": [1]}
        ]"#,
    );
    tp(&dir)
        .arg("next")
        .assert()
        .code(3)
        .stderr(contains("1 -> 2 -> 1"));
}

#[test]
fn invalid_priority_is_rejected_without_writing() {
    let dir = TempDir::new().unwrap();
    let original = r#"[{"id": 1, "title": "A", "priority": "low"}]"#;
    write_tasks(&dir, original);
    tp(&dir)
        .args(["set-priority", "1", "urgent"])
        .assert()
        .code(2)
        .stderr(contains("Must be one of: critical, high, medium, low"));
    assert_eq!(
        fs::read_to_string(dir.path().join("tasks/tasks.json")).unwrap(),
        original
    );
}

#[test]
fn invalid_hours_and_dates_are_rejected() {
    let dir = TempDir::new().unwrap();
    write_tasks(&dir, r#"[{"id": 1, "title": "A"}]"#);
    tp(&dir)
        .args(["set-hours", "1", "0"])
        .assert()
        .code(2)
        .stderr(contains("positive number"));
    tp(&dir)
        .args(["set-hours", "1", "abc"])
        .assert()
        .code(2);
    tp(&dir)
        .args(["set-due", "1", "03/01/2025"])
        .assert()
        .code(2)
        .stderr(contains("YYYY-MM-DD"));
    tp(&dir)
        .args(["set-due", "1", "2025-02-30"])
        .assert()
        .code(2);
}

#[test]
fn unknown_task_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    write_tasks(&dir, r#"[{"id": 1, "title": "A"}]"#);
    tp(&dir)
        .args(["set-priority", "9", "high"])
        .assert()
        .code(2)
        .stderr(contains("Task with ID 9 not found"));
}

#[test]
fn malformed_task_list_fails() {
    let dir = TempDir::new().unwrap();
    write_tasks(&dir, "{ not json");
    tp(&dir).arg("list").assert().code(4);
}

#[test]
fn schedule_writes_buckets() {
    let dir = TempDir::new().unwrap();
    write_tasks(
        &dir,
        r#"[
            {"id": 1, "title": "Hot", "priority": "critical", "estimatedHours": 1},
            {"id": 2, "title": "Cold", "priority": "low"},
            {"id": 3, "title": "Finished", "status": "done", "priority": "critical"}
        ]"#,
    );
    tp(&dir)
        .args(["schedule", "--hours-per-day", "4"])
        .assert()
        .success()
        .stdout(contains("Critical & Immediate"))
        .stdout(contains("Planning with 4 productive hours per day"));

    let schedule = read_json(&dir.path().join("tasks/schedule.json"));
    assert_eq!(schedule["totalTasks"], 2);
    assert_eq!(schedule["hoursPerDay"], 4.0);
    assert_eq!(schedule["immediate"]["count"], 1);
    assert_eq!(schedule["immediate"]["tasks"][0]["priorityScore"], 95);
    assert_eq!(schedule["upcoming"]["count"], 1);
    assert_eq!(schedule["upcoming"]["estimatedHours"], 2.0);
    assert_eq!(schedule["upcoming"]["tasks"][0]["priority"], "low");
    assert_eq!(schedule["backlog"]["count"], 0);
}

#[test]
fn schedule_rejects_non_positive_hours_per_day() {
    let dir = TempDir::new().unwrap();
    write_tasks(&dir, r#"[{"id": 1, "title": "A"}]"#);
    tp(&dir)
        .args(["schedule", "--hours-per-day", "0"])
        .assert()
        .code(2);
    assert!(!dir.path().join("tasks/schedule.json").exists());
}

#[test]
fn schedule_with_no_tasks_is_informational() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .arg("schedule")
        .assert()
        .success()
        .stdout(contains("No tasks found to schedule"));
}

#[test]
fn set_priority_can_refresh_schedule() {
    let dir = TempDir::new().unwrap();
    write_tasks(&dir, r#"[{"id": 1, "title": "A", "priority": "low"}]"#);
    tp(&dir)
        .args(["set-priority", "1", "critical", "--update-schedule"])
        .assert()
        .success()
        .stdout(contains("priority updated from low to critical"));
    let schedule = read_json(&dir.path().join("tasks/schedule.json"));
    assert_eq!(schedule["immediate"]["tasks"][0]["id"], 1);
}

#[test]
fn analyze_and_report_complexity() {
    let dir = TempDir::new().unwrap();
    let long = "x".repeat(1200);
    write_tasks(
        &dir,
        &format!(
            r#"[
                {{"id": 1, "title": "Big", "description": "{long}", "priority": "high"}},
                {{"id": 2, "title": "Small"}}
            ]"#
        ),
    );
    tp(&dir)
        .args(["analyze-complexity", "--threshold", "8"])
        .assert()
        .success()
        .stdout(contains("Found 1 high complexity tasks."));

    let report = read_json(&dir.path().join("scripts/task-complexity-report.json"));
    assert_eq!(report["tasks"][0]["taskId"], 1);
    assert_eq!(report["tasks"][0]["complexity"], 8);
    assert_eq!(report["tasks"][0]["recommended"]["needsExpansion"], true);
    assert_eq!(report["tasks"][1]["recommended"]["needsExpansion"], false);

    tp(&dir)
        .arg("complexity-report")
        .assert()
        .success()
        .stdout(contains("tp expand 1 --num 4"));
}

#[test]
fn analyze_threshold_out_of_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .args(["analyze-complexity", "--threshold", "11"])
        .assert()
        .failure();
}

#[test]
fn missing_report_prints_guidance() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .arg("complexity-report")
        .assert()
        .success()
        .stdout(contains("tp analyze-complexity"));
}

#[test]
fn expand_adds_numbered_subtasks() {
    let dir = TempDir::new().unwrap();
    write_tasks(
        &dir,
        r#"[{"id": 5, "title": "Login", "description": "User login flow"}]"#,
    );
    tp(&dir)
        .args(["expand", "5", "--num", "2"])
        .assert()
        .success()
        .stdout(contains("[5.1] Provider Login"));
    tp(&dir)
        .args(["expand", "5"])
        .assert()
        .success()
        .stdout(contains("Use --force"));

    let tasks = read_json(&dir.path().join("tasks/tasks.json"));
    assert_eq!(tasks[0]["subtasks"].as_array().unwrap().len(), 2);
    assert_eq!(tasks[0]["subtasks"][1]["id"], "5.2");
}

#[test]
fn bad_config_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("taskplan.toml"), "hours_per_day = 0.0\n").unwrap();
    tp(&dir).arg("list").assert().code(2);
}

#[test]
fn malformed_config_file_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("taskplan.toml"), "default_priority = \"urgent\"\n").unwrap();
    tp(&dir)
        .arg("list")
        .assert()
        .code(2)
        .stderr(contains("Invalid configuration"));
}

#[test]
fn missing_explicit_config_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .args(["--config", "absent.toml", "list"])
        .assert()
        .code(2);
}

#[test]
fn oversized_default_subtasks_is_rejected() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .env("DEFAULT_SUBTASKS", "4294967295")
        .arg("list")
        .assert()
        .code(2);
}

#[test]
fn env_default_priority_must_be_valid() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .env("DEFAULT_PRIORITY", "urgent")
        .arg("list")
        .assert()
        .code(2);
}

#[test]
fn unknown_fields_are_preserved_on_write() {
    let dir = TempDir::new().unwrap();
    write_tasks(
        &dir,
        r#"[{"id": 1, "title": "A", "applicableRules": ["x"], "status": "pending"}]"#,
    );
    tp(&dir).args(["set-status", "1", "done"]).assert().success();
    let tasks = read_json(&dir.path().join("tasks/tasks.json"));
    assert_eq!(tasks[0]["applicableRules"][0], "x");
    assert_eq!(tasks[0]["status"], "done");
    assert!(tasks[0]["completedAt"].is_string());
}

#[test]
fn completions_generate_a_script() {
    let dir = TempDir::new().unwrap();
    tp(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(contains("tp"));
}
