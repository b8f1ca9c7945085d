//! Integration tests for the docchat binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn docchat_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docchat").unwrap();
    cmd.env("DOCCHAT_CONFIG", home.path().join("config.yml"))
        .env("DOCCHAT_INDEX_DIR", home.path().join("indexes"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("schedule"));
}

#[test]
fn test_route_scheduling() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .args(["route", "please", "schedule", "a", "call", "for", "tomorrow"])
        .assert()
        .success()
        .stdout("scheduling\n");
}

#[test]
fn test_route_document_question_json() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .args(["--format", "json", "route", "what does section 2 say"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"route\": \"document-question\""));
}

#[test]
fn test_route_uses_configured_triggers() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.yml"),
        "router:\n  triggers:\n    - ring me\n",
    )
    .unwrap();

    docchat_cmd(&home)
        .args(["route", "please ring me"])
        .assert()
        .success()
        .stdout("scheduling\n");
    docchat_cmd(&home)
        .args(["route", "schedule it"])
        .assert()
        .success()
        .stdout("document-question\n");
}

#[test]
fn test_schedule_collects_details_from_stdin() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("schedule")
        .write_stdin("Ada Lovelace\nnot-an-email\nada@example.com\n(650) 253-0000\n2025-03-03\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("not a valid email"))
        .stdout(predicate::str::contains("Thank you, Ada Lovelace!"))
        .stdout(predicate::str::contains("2025-03-03"))
        .stdout(predicate::str::contains("+16502530000"));
}

#[test]
fn test_schedule_aborts_on_end_of_input() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("schedule")
        .write_stdin("Ada Lovelace\n")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("aborted"));
}

#[test]
fn test_ask_missing_document_exits_not_found() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .args(["ask"])
        .arg(home.path().join("missing.pdf"))
        .arg("what is this about?")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Document not found"));
}

#[test]
fn test_ask_scheduling_request_points_to_schedule() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("ask")
        .arg(home.path().join("missing.pdf"))
        .args(["please", "call", "me"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docchat schedule"));
    assert!(!home.path().join("indexes").exists());
}

#[test]
fn test_index_rejects_non_pdf() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("notes.pdf");
    fs::write(&path, "just some plain text, not a PDF").unwrap();

    docchat_cmd(&home)
        .arg("index")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to ingest document"));
}

#[test]
fn test_chat_without_document_is_not_ready() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("chat")
        .write_stdin("what is this about?\n/exit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No document is loaded. Please upload a document first.",
        ));
}

#[test]
fn test_chat_routes_to_intake() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("chat")
        .write_stdin("Can you call me?\nAda\n/cancel\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("What is your name?"))
        .stdout(predicate::str::contains("What is your email address?"))
        .stdout(predicate::str::contains("I won't arrange a call"));
}

#[test]
fn test_config_shows_defaults() {
    let home = TempDir::new().unwrap();
    docchat_cmd(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("llm_service"))
        .stdout(predicate::str::contains("chunk_size: 1000"))
        .stdout(predicate::str::contains("top_k: 4"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.yml"),
        "ingest:\n  chunk_size: 100\n  chunk_overlap: 100\n",
    )
    .unwrap();

    docchat_cmd(&home)
        .arg("config")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("chunk_overlap"));
}
