use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn sqlgrade(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sqlgrade").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SQLGRADE_DB")
        .env_remove("SQLGRADE_PROGRESS_DB")
        .env_remove("SQLGRADE_QUESTIONS")
        .env_remove("SQLGRADE_FORMAT")
        .env("SQLGRADE_LOG", "warn");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    sqlgrade(&dir).arg("init").assert().success();
    dir
}

#[test]
fn init_creates_database_bank_and_progress() {
    let dir = TempDir::new().unwrap();
    sqlgrade(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(contains("created data/crm.db"));
    assert!(dir.path().join("data/crm.db").exists());
    assert!(dir.path().join("questions.yaml").exists());
    assert!(dir.path().join(".sqlgrade/progress.db").exists());

    sqlgrade(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(contains("already exists"));
}

#[test]
fn init_writes_the_bundled_bank() {
    let dir = initialized();
    let bank = std::fs::read_to_string(dir.path().join("questions.yaml")).unwrap();
    assert!(bank.starts_with("version: 1"));
    assert!(bank.contains("id: ab_10"));
    assert!(bank.contains("module: ab_test"));
}

#[test]
fn submit_reference_query_is_correct() {
    let dir = initialized();
    sqlgrade(&dir)
        .args([
            "submit",
            "basics_1",
            "--sql",
            "SELECT acquisition_channel AS ch, COUNT(*) AS n FROM customers GROUP BY 1;",
        ])
        .assert()
        .code(0)
        .stdout(contains("CORRECT [100/100]"));

    sqlgrade(&dir)
        .args(["progress", "--format", "json"])
        .assert()
        .success()
        .stdout(contains("\"completed\": 1"));
}

#[test]
fn wrong_submission_exits_one() {
    let dir = initialized();
    sqlgrade(&dir)
        .args(["submit", "basics_1", "--sql", "SELECT region, COUNT(*) FROM customers GROUP BY region"])
        .assert()
        .code(1)
        .stdout(contains("[").and(contains("/100]")));
}

#[test]
fn sql_error_is_reported_not_fatal() {
    let dir = initialized();
    sqlgrade(&dir)
        .args(["submit", "basics_1", "--sql", "SELECT nope FROM nowhere"])
        .assert()
        .code(1)
        .stdout(contains("error:").and(contains("Run the query first.")));
}

#[test]
fn unknown_question_suggests_closest_id() {
    let dir = initialized();
    sqlgrade(&dir)
        .args(["show", "basic_1"])
        .assert()
        .code(2)
        .stderr(contains("Did you mean 'basics_1'?"));
}

#[test]
fn commands_before_init_are_config_errors() {
    let dir = TempDir::new().unwrap();
    sqlgrade(&dir)
        .args(["query", "--sql", "SELECT 1"])
        .assert()
        .code(2)
        .stderr(contains("run `sqlgrade init` first"));
}

#[test]
fn query_prints_table_and_rejects_writes() {
    let dir = initialized();
    sqlgrade(&dir)
        .args(["query", "--sql", "SELECT COUNT(*) AS n FROM campaigns"])
        .assert()
        .success()
        .stdout(contains("24").and(contains("(1 rows)")));

    sqlgrade(&dir)
        .args(["query", "--sql", "DELETE FROM customers"])
        .assert()
        .code(1)
        .stderr(contains("read-only"));
}

#[test]
fn show_reveals_requested_hints_only() {
    let dir = initialized();
    sqlgrade(&dir)
        .args(["show", "cohort_3", "--hints", "1"])
        .assert()
        .success()
        .stdout(contains("Hint 1:").and(contains("Hint 2:").not()));
}

#[test]
fn practice_loop_runs_and_checks() {
    let dir = initialized();
    sqlgrade(&dir)
        .args(["practice", "funnel_1"])
        .write_stdin(
            ":hint\nSELECT event_type, COUNT(DISTINCT user_id)\nFROM events GROUP BY 1;\n:check\n:quit\n",
        )
        .assert()
        .success()
        .stdout(contains("Hint 1/1").and(contains("CORRECT [100/100]")));

    sqlgrade(&dir)
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(contains("\"completed\": true"));
}

#[test]
fn version_prints_package_version() {
    let dir = TempDir::new().unwrap();
    sqlgrade(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}
