//! End-to-end tests of the non-interactive subcommands.

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn todos(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("todos"));
    cmd.arg("--data-dir").arg(dir.path());
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    cmd
}

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

fn add(dir: &TempDir, category: &str, text: &str) -> String {
    let output = todos(dir).args(["add", category, text]).output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn add_then_list_by_category() {
    let dir = setup();
    add(&dir, "work", "Write report");
    add(&dir, "travel", "Visit Oslo");

    todos(&dir)
        .args(["list", "--category", "travel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Visit Oslo"))
        .stdout(predicate::str::contains("Write report").not());
}

#[test]
fn add_joins_words() {
    let dir = setup();
    todos(&dir)
        .args(["add", "work", "Buy", "milk"])
        .assert()
        .success();
    todos(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ]").and(predicate::str::contains("Buy milk (Work)")));
}

#[test]
fn add_rejects_blank_text() {
    let dir = setup();
    todos(&dir)
        .args(["add", "work", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn done_marks_and_undo_clears() {
    let dir = setup();
    let id = add(&dir, "work", "Ship it");

    todos(&dir).args(["done", &id]).assert().success();
    todos(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains(format!("[x] {id} Ship it")));

    todos(&dir).args(["done", &id, "--undo"]).assert().success();
    todos(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains(format!("[ ] {id} Ship it")));
}

#[test]
fn rm_requires_yes() {
    let dir = setup();
    let id = add(&dir, "travel", "Hike");

    todos(&dir)
        .args(["rm", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    todos(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("Hike"));

    todos(&dir).args(["rm", &id, "--yes"]).assert().success();
    todos(&dir)
        .arg("list")
        .assert()
        .stdout(predicate::str::contains("Hike").not());
}

#[test]
fn unknown_id_fails() {
    let dir = setup();
    todos(&dir)
        .args(["done", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no task with id 12345"));
}

#[test]
fn unknown_category_is_rejected() {
    let dir = setup();
    todos(&dir)
        .args(["add", "home", "Water plants"])
        .assert()
        .failure();
}
