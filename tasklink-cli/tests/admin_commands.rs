use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

use tasklink_core::{LinkStore, SqliteStore};

fn tasklink_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tasklink"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("TASKLINK_CLICKUP_TOKEN")
        .env_remove("TASKLINK_MOTION_API_KEY")
        .env_remove("TASKLINK_DATABASE")
        .env("NO_COLOR", "1");
    cmd
}

fn open_store(home: &Path) -> SqliteStore {
    SqliteStore::open(home.join(".tasklink").join("tasklink.db")).expect("open store")
}

#[test]
fn pairing_add_then_list() {
    let home = TempDir::new().expect("home");

    tasklink_cmd(home.path())
        .args(["pairing", "add", "901", "ws_main", "--label", "inbox"])
        .assert()
        .success()
        .stdout(contains("Added pairing 1 (inbox)"));

    tasklink_cmd(home.path())
        .args(["pairing", "list"])
        .assert()
        .success()
        .stdout(contains("inbox"))
        .stdout(contains("ws_main"))
        .stdout(contains("never"));
}

#[test]
fn pairing_list_json_is_parseable() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .args(["pairing", "add", "901", "ws_main"])
        .assert()
        .success();

    let output = tasklink_cmd(home.path())
        .args(["pairing", "list", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["pairings"][0]["clickup_list_id"], "901");
    assert_eq!(value["pairings"][0]["active"], true);
}

#[test]
fn second_pairing_into_same_workspace_warns() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .args(["pairing", "add", "901", "ws_main"])
        .assert()
        .success();

    tasklink_cmd(home.path())
        .args(["pairing", "add", "902", "ws_main"])
        .assert()
        .success()
        .stderr(contains("already paired with list 901"));
}

#[test]
fn deactivate_unknown_pairing_fails() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .args(["pairing", "deactivate", "42"])
        .assert()
        .failure()
        .stderr(contains("pairing 42"));
}

#[test]
fn deactivate_and_reset_cursor() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .args(["pairing", "add", "901", "ws_main"])
        .assert()
        .success();

    tasklink_cmd(home.path())
        .args(["pairing", "deactivate", "1"])
        .assert()
        .success()
        .stdout(contains("deactivated"));
    tasklink_cmd(home.path())
        .args(["pairing", "reset-cursor", "1"])
        .assert()
        .success();

    let store = open_store(home.path());
    assert!(store.active_pairings().expect("pairings").is_empty());
}

#[test]
fn crosswalk_add_list_remove() {
    let home = TempDir::new().expect("home");

    tasklink_cmd(home.path())
        .args(["crosswalk", "add", "81", "mu_ada", "--label", "Ada"])
        .assert()
        .success();
    tasklink_cmd(home.path())
        .args(["crosswalk", "list"])
        .assert()
        .success()
        .stdout(contains("mu_ada"))
        .stdout(contains("Ada"));
    tasklink_cmd(home.path())
        .args(["crosswalk", "remove", "81"])
        .assert()
        .success()
        .stdout(contains("Removed mapping"));

    assert!(open_store(home.path()).load_crosswalk().expect("crosswalk").is_empty());
}

#[test]
fn link_delete_by_motion_id() {
    let home = TempDir::new().expect("home");
    open_store(home.path()).insert_link("a1", "b1").expect("link");

    tasklink_cmd(home.path())
        .args(["link", "list"])
        .assert()
        .success()
        .stdout(contains("a1"));
    tasklink_cmd(home.path())
        .args(["link", "delete", "--motion", "b1"])
        .assert()
        .success()
        .stdout(contains("Removed link for Motion task b1"));

    assert!(open_store(home.path()).find_by_clickup("a1").expect("lookup").is_none());
}

#[test]
fn link_delete_requires_a_side() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .args(["link", "delete"])
        .assert()
        .failure();
}

#[test]
fn run_without_credentials_fails_before_any_work() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .args(["run"])
        .assert()
        .failure()
        .stderr(contains("clickup.api_token"));
}

#[test]
fn run_with_placeholder_credential_fails() {
    let home = TempDir::new().expect("home");
    let config_dir = home.path().join(".tasklink");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::write(
        config_dir.join("config.yaml"),
        "clickup:\n  api_token: changeme\nmotion:\n  api_key: mk_real\n",
    )
    .expect("write config");

    tasklink_cmd(home.path())
        .args(["run"])
        .assert()
        .failure()
        .stderr(contains("clickup.api_token"));
}

#[test]
fn run_without_active_pairings_is_a_configuration_failure() {
    let home = TempDir::new().expect("home");
    tasklink_cmd(home.path())
        .env("TASKLINK_CLICKUP_TOKEN", "pk_test")
        .env("TASKLINK_MOTION_API_KEY", "mk_test")
        .args(["run"])
        .assert()
        .failure()
        .stderr(contains("no active pairings"));
}
