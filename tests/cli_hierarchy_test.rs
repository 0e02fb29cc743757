//! Integration tests for building the hierarchy offline.
//!
//! `roster hierarchy --input <file>` reads a previously written
//! employees.json and never needs credentials or the network.

mod common;

use common::TestEnv;
use predicates::prelude::*;

const ROSTER: &str = r#"[
  {"id": "1", "name": "Ann Lee", "display_name": "Ann Lee", "job_title": "CEO"},
  {"id": "2", "name": "Ben Ortiz", "display_name": "Ben Ortiz", "manager_id": "1"},
  {"id": "3", "name": "Cal Moss", "display_name": "Cal Moss", "manager_id": "1"},
  {"id": "4", "name": "Dee Park", "display_name": "Dee Park", "manager_id": "2"},
  {"id": "5", "name": "Eve Ray", "display_name": "Eve Ray"}
]"#;

#[test]
fn test_hierarchy_from_file_json() {
    let env = TestEnv::new();
    env.write("employees.json", ROSTER);

    let output = env
        .roster()
        .args(["hierarchy", "--input", "employees.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let forest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        forest,
        serde_json::json!([
            {"id": "1", "employees": [
                {"id": "2", "employees": [{"id": "4"}]},
                {"id": "3"}
            ]},
            {"id": "5"}
        ])
    );
}

#[test]
fn test_hierarchy_from_file_human() {
    let env = TestEnv::new();
    env.write("employees.json", ROSTER);

    env.roster()
        .args(["-H", "hierarchy", "-i", "employees.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\
Ann Lee (CEO) [1]
├── Ben Ortiz [2]
│   └── Dee Park [4]
└── Cal Moss [3]
Eve Ray [5]",
        ));
}

#[test]
fn test_hierarchy_from_file_leaves_out_cycles() {
    let env = TestEnv::new();
    env.write(
        "employees.json",
        r#"[
            {"id": "1", "name": "A", "display_name": "A"},
            {"id": "2", "name": "B", "display_name": "B", "manager_id": "3"},
            {"id": "3", "name": "C", "display_name": "C", "manager_id": "2"}
        ]"#,
    );

    env.roster()
        .args(["-H", "hierarchy", "--input", "employees.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A [1]"))
        .stdout(predicate::str::contains("Left out of hierarchy (2): 2, 3"));
}

#[test]
fn test_hierarchy_from_empty_roster() {
    let env = TestEnv::new();
    env.write("employees.json", "[]");

    env.roster()
        .args(["hierarchy", "--input", "employees.json"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_hierarchy_input_missing_file() {
    let env = TestEnv::new();

    env.roster()
        .args(["hierarchy", "--input", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_hierarchy_input_invalid_json() {
    let env = TestEnv::new();
    env.write("employees.json", "{not json");

    env.roster()
        .args(["hierarchy", "--input", "employees.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_hierarchy_roundtrips_sync_output() {
    let env = TestEnv::new();
    let server = common::FakeBamboo::healthy();

    env.roster_against(&server).arg("sync").assert().success();

    let output = env
        .roster()
        .args(["hierarchy", "--input", "finalData/employees.json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let offline: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(offline, env.read_json("finalData/hierarchy.json"));
}
