//! CLI error specs

use crate::prelude::*;

#[test]
fn run_without_runbook_fails() {
    let temp = Project::empty();

    temp.mf()
        .args(&["run", "--target", "dev", "--version", "1.0.0"])
        .fails()
        .stderr_has("loading runbook");
}

#[test]
fn unknown_target_is_rejected() {
    let temp = Project::with_runbook(SHELL_RUNBOOK);

    temp.mf()
        .args(&["steps", "--target", "staging"])
        .fails()
        .stderr_has("unknown build target");
}

#[test]
fn runbook_naming_unknown_step_is_rejected() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["ghost"]
"#,
    );

    temp.mf()
        .args(&["steps", "--target", "development"])
        .fails()
        .stderr_has("unknown step: ghost");
}

#[test]
fn malformed_env_pair_is_rejected() {
    let temp = Project::with_runbook(SHELL_RUNBOOK);

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1", "--env", "NOPE"])
        .fails()
        .stderr_has("KEY=VALUE");
}

#[test]
fn show_unknown_build_fails() {
    let temp = Project::empty();

    temp.mf().args(&["show", "nope"]).fails();
}
