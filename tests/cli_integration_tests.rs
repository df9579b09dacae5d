//! End-to-end CLI integration tests
//!
//! These tests use assert_cmd to drive the `handover` binary against a
//! temporary file store.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::process::Command;
use tempfile::TempDir;

/// Helper for setting up CLI test environment
struct CliTestEnvironment {
    temp_dir: TempDir,
}

impl CliTestEnvironment {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let draft = json!({
            "handing_over_employee": { "id": "e-100", "name": "Harriet" },
            "taking_over_employee": { "id": "e-200", "name": "Tomas" },
            "line_manager": { "id": "e-300", "name": "Lena" },
            "start_date": "2024-07-01",
            "end_date": "2024-07-31",
            "contacts": "Accounting: ext. 4411",
            "tasks": [
                { "description": "Quarterly VAT filing" },
                { "description": "Supplier onboarding backlog", "initial_comment": "see wiki" }
            ]
        });
        std::fs::write(
            temp_dir.path().join("draft.json"),
            serde_json::to_string_pretty(&draft).unwrap(),
        )
        .unwrap();
        Self { temp_dir }
    }

    fn handover(&self, actor: Option<&str>) -> Command {
        let mut cmd = Command::cargo_bin("handover").unwrap();
        cmd.current_dir(self.temp_dir.path())
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.temp_dir.path().join("records"));
        if let Some(actor) = actor {
            cmd.args(["--actor", actor]);
        }
        cmd
    }

    fn json(&self, actor: Option<&str>, args: &[&str]) -> Value {
        let output = self
            .handover(actor)
            .arg("--json")
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn create(&self) -> (String, String) {
        let created = self.json(Some("e-100"), &["create", "--file", "draft.json"]);
        let id = created["id"].as_str().unwrap().to_string();
        let task_id = created["tasks"][0]["id"].as_str().unwrap().to_string();
        (id, task_id)
    }
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("handover")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("task-log"));
}

#[test]
fn test_create_then_show() {
    let env = CliTestEnvironment::new();
    let (id, _) = env.create();

    env.handover(None)
        .args(["show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATED"))
        .stdout(predicate::str::contains("Quarterly VAT filing"));

    let listed = env.json(None, &["list"]);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["status"], "CREATED");
}

#[test]
fn test_sign_flow_and_duplicate_signature() {
    let env = CliTestEnvironment::new();
    let (id, _) = env.create();

    env.handover(Some("e-100"))
        .args(["apply", &id, "sign_ho"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SIGNED_BY_HANDING_OVER"));

    env.handover(Some("e-100"))
        .args(["apply", &id, "sign_ho"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already signed"));

    let log = env.json(None, &["log", &id]);
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["action"], "sign_ho");
}

#[test]
fn test_line_manager_actions_and_required_comment() {
    let env = CliTestEnvironment::new();
    let (id, _) = env.create();
    env.handover(Some("e-100")).args(["apply", &id, "sign_ho"]).assert().success();
    env.handover(Some("e-200")).args(["apply", &id, "sign_to"]).assert().success();

    let actions = env.json(Some("e-300"), &["actions", &id]);
    let names: Vec<&str> = actions
        .as_array()
        .unwrap()
        .iter()
        .map(|action| action["action"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["approve", "reject", "clarify"]);

    env.handover(Some("e-300"))
        .args(["apply", &id, "clarify"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a non-empty comment"));

    env.handover(Some("e-200"))
        .args(["apply", &id, "reject", "--comment", "not ready"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("may not reject"));

    env.handover(Some("e-300"))
        .args(["apply", &id, "clarify", "-m", "who owns the portal?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NEED_CLARIFICATION"));
}

#[test]
fn test_task_update_and_log() {
    let env = CliTestEnvironment::new();
    let (_, task_id) = env.create();

    env.handover(Some("e-200"))
        .args(["task", &task_id, "IN_PROGRESS", "--comment", "started"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IN_PROGRESS"));

    env.handover(Some("e-100"))
        .args(["task", &task_id, "COMPLETED"])
        .assert()
        .failure();

    env.handover(Some("e-200"))
        .args(["task", &task_id, "in-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected one of"));

    let log = env.json(None, &["task-log", &task_id]);
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["old_status"], "NOT_STARTED");
    assert_eq!(log[0]["new_status"], "IN_PROGRESS");
    assert_eq!(log[0]["comment"], "started");
}

#[test]
fn test_writes_need_an_actor() {
    let env = CliTestEnvironment::new();
    let (id, _) = env.create();

    env.handover(None)
        .args(["apply", &id, "sign_ho"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--actor"));
}

#[test]
fn test_unknown_handover_fails() {
    let env = CliTestEnvironment::new();
    env.handover(None)
        .args(["show", "6f1c2d4e-0000-4000-8000-000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_config_prints_and_writes() {
    let env = CliTestEnvironment::new();
    env.handover(None)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_comment_length"));

    env.handover(None)
        .args(["config", "--write", "handover.toml"])
        .assert()
        .success();
    let written = std::fs::read_to_string(env.temp_dir.path().join("handover.toml")).unwrap();
    assert!(written.contains("[workflow]"));
}
