use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn typeb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("typeb").unwrap();
    cmd.current_dir(dir.path()).env("TYPEB_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    typeb(dir).arg("init").assert().success();
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

fn setup_family(dir: &TempDir) -> String {
    init_project(dir);
    let family = json_output(typeb(dir).args([
        "family",
        "create",
        "smith",
        "The",
        "Smiths",
        "--creator",
        "mom",
        "-j",
    ]));
    family["invite_code"].as_str().unwrap().to_string()
}

/// Far-future due time whose whole ladder sits outside the default quiet
/// window, so planning is deterministic regardless of when the tests run.
const DUE: &str = "2099-06-15T12:00:00Z";

// ---------------------------------------------------------------------------
// typeb init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    typeb(&dir).arg("init").assert().success();

    assert!(dir.path().join(".typeb").is_dir());
    assert!(dir.path().join(".typeb/families").is_dir());
    assert!(dir.path().join(".typeb/prefs").is_dir());
    assert!(dir.path().join(".typeb/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    typeb(&dir).arg("init").assert().success();
    typeb(&dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// typeb family
// ---------------------------------------------------------------------------

#[test]
fn family_create_join_and_list() {
    let dir = TempDir::new().unwrap();
    let code = setup_family(&dir);

    typeb(&dir)
        .args(["family", "join", &code, "--user", "kid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kid joined family 'smith'"));

    typeb(&dir)
        .args(["family", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("smith"))
        .stdout(predicate::str::contains("2"));
}

#[test]
fn join_with_bad_code_fails() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    typeb(&dir)
        .args(["family", "join", "XXXXXX", "--user", "kid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invite code"));
}

#[test]
fn last_parent_cannot_be_demoted() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    typeb(&dir)
        .args(["family", "demote", "smith", "mom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one parent"));
}

// ---------------------------------------------------------------------------
// typeb task + schedule
// ---------------------------------------------------------------------------

#[test]
fn task_add_plans_four_reminders() {
    let dir = TempDir::new().unwrap();
    let code = setup_family(&dir);
    typeb(&dir)
        .args(["family", "join", &code, "--user", "kid"])
        .assert()
        .success();

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Do", "homework", "--assignee", "kid", "--by", "mom", "--due",
        DUE, "--offset", "30", "-j",
    ]));
    assert_eq!(added["reminders_planned"], 4);

    let entries = json_output(typeb(&dir).args(["schedule", "list", "-j"]));
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().all(|e| e["status"] == "scheduled"));
    // Manager alert goes to the parent, the rest to the assignee.
    assert_eq!(entries[3]["level"], "manager_alert");
    assert_eq!(entries[3]["recipient_id"], "mom");
    assert_eq!(entries[0]["recipient_id"], "kid");
}

#[test]
fn complete_cancels_reminders_and_tick_fires_nothing() {
    let dir = TempDir::new().unwrap();
    let code = setup_family(&dir);
    typeb(&dir)
        .args(["family", "join", &code, "--user", "kid"])
        .assert()
        .success();

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Feed", "the", "dog", "--assignee", "kid", "--by", "mom",
        "--due", DUE, "-j",
    ]));
    let task_id = added["task"]["id"].as_str().unwrap().to_string();

    let completed = json_output(typeb(&dir).args([
        "task", "complete", "smith", &task_id, "--user", "kid", "-j",
    ]));
    assert_eq!(completed["reminders_cancelled"], 4);

    let report = json_output(typeb(&dir).args([
        "remind",
        "tick",
        "--at",
        "2099-06-15T12:01:00Z",
        "-j",
    ]));
    assert_eq!(report["fired"], 0);
}

#[test]
fn photo_required_task_needs_photo_ref() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Clean", "room", "--assignee", "mom", "--by", "mom", "--photo",
        "-j",
    ]));
    let task_id = added["task"]["id"].as_str().unwrap().to_string();

    typeb(&dir)
        .args(["task", "complete", "smith", &task_id, "--user", "mom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("photo"));

    typeb(&dir)
        .args([
            "task",
            "complete",
            "smith",
            &task_id,
            "--user",
            "mom",
            "--photo-ref",
            "photos/room.jpg",
        ])
        .assert()
        .success();
}

#[test]
fn edit_reassigns_and_replans() {
    let dir = TempDir::new().unwrap();
    let code = setup_family(&dir);
    typeb(&dir)
        .args(["family", "join", &code, "--user", "kid"])
        .assert()
        .success();

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Set", "the", "table", "--assignee", "mom", "--by", "mom",
        "--due", DUE, "-j",
    ]));
    let task_id = added["task"]["id"].as_str().unwrap().to_string();

    let edited = json_output(typeb(&dir).args([
        "task", "edit", "smith", &task_id, "--assignee", "kid", "--priority", "high", "-j",
    ]));
    assert_eq!(edited["task"]["assignee_id"], "kid");
    assert_eq!(edited["task"]["priority"], "high");
    assert_eq!(edited["reminders_planned"], 4);

    // The pre-due rungs now address the new assignee.
    let entries = json_output(typeb(&dir).args([
        "schedule", "list", "--status", "scheduled", "-j",
    ]));
    assert_eq!(entries[0]["recipient_id"], "kid");
}

#[test]
fn edit_without_due_date_cancels_ladder() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Water", "plants", "--assignee", "mom", "--by", "mom", "--due",
        DUE, "-j",
    ]));
    let task_id = added["task"]["id"].as_str().unwrap().to_string();
    assert_eq!(added["reminders_planned"], 4);

    let edited = json_output(typeb(&dir).args(["task", "edit", "smith", &task_id, "--no-due", "-j"]));
    assert!(edited["task"]["due_at"].is_null());
    assert_eq!(edited["reminders_planned"], 0);

    let entries = json_output(typeb(&dir).args([
        "schedule", "list", "--status", "scheduled", "-j",
    ]));
    assert!(entries.as_array().unwrap().is_empty());
}

#[test]
fn tick_fires_due_entries() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    typeb(&dir)
        .args([
            "task", "add", "smith", "Take", "out", "trash", "--assignee", "mom", "--by", "mom",
            "--due", DUE,
        ])
        .assert()
        .success();

    // Nothing is due before the ladder starts.
    let early = json_output(typeb(&dir).args([
        "remind",
        "tick",
        "--at",
        "2099-06-15T11:00:00Z",
        "-j",
    ]));
    assert_eq!(early["fired"], 0);

    let report = json_output(typeb(&dir).args([
        "remind",
        "tick",
        "--at",
        "2099-06-15T12:01:00Z",
        "-j",
    ]));
    assert_eq!(report["fired"], 4);

    let fired = json_output(typeb(&dir).args(["schedule", "list", "--status", "fired", "-j"]));
    assert_eq!(fired.as_array().unwrap().len(), 4);
}

#[test]
fn schedule_preview_shows_ladder_without_writing() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Water", "plants", "--assignee", "mom", "--by", "mom", "--due",
        DUE, "-j",
    ]));
    let task_id = added["task"]["id"].as_str().unwrap().to_string();

    let preview = json_output(typeb(&dir).args(["schedule", "preview", "smith", &task_id, "-j"]));
    let levels: Vec<&str> = preview
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["level"].as_str().unwrap())
        .collect();
    assert_eq!(
        levels,
        vec!["initial", "follow_up", "final_call", "manager_alert"]
    );
}

// ---------------------------------------------------------------------------
// typeb prefs
// ---------------------------------------------------------------------------

#[test]
fn disabling_reminders_plans_nothing() {
    let dir = TempDir::new().unwrap();
    setup_family(&dir);

    typeb(&dir)
        .args(["prefs", "set", "mom", "--disable"])
        .assert()
        .success();

    let added = json_output(typeb(&dir).args([
        "task", "add", "smith", "Read", "a", "book", "--assignee", "mom", "--by", "mom",
        "--due", DUE, "-j",
    ]));
    assert_eq!(added["reminders_planned"], 0);
}

#[test]
fn prefs_set_quiet_hours() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let prefs = json_output(typeb(&dir).args([
        "prefs",
        "set",
        "mom",
        "--quiet-start",
        "22:00",
        "--quiet-end",
        "06:30",
        "-j",
    ]));
    assert_eq!(prefs["quiet_hours"]["start"], "22:00:00");
    assert_eq!(prefs["quiet_hours"]["end"], "06:30:00");
}

// ---------------------------------------------------------------------------
// typeb config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_passes_on_defaults() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    typeb(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration OK"));
}

// ---------------------------------------------------------------------------
// error surface
// ---------------------------------------------------------------------------

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();

    typeb(&dir)
        .args(["family", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("typeb init"));
}
