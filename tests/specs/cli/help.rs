//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.mf()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("steps")
        .stdout_has("show");
}

#[test]
fn run_help_lists_options() {
    let temp = Project::empty();

    temp.mf()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--target")
        .stdout_has("--version")
        .stdout_has("--env")
        .stdout_has("--state-dir");
}

#[test]
fn version_flag_prints_version() {
    assert_cmd::Command::cargo_bin("mf")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::starts_with("mf "));
}
