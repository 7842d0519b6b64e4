//! Restore cascade specs
//!
//! Verify failed release builds run the restore steps.

use crate::prelude::*;

const RELEASE_RUNBOOK: &str = r#"
[target]
development = ["lock", "deploy", "unlock"]
release = ["lock", "backup", "deploy", "publish", "unlock"]
restore = ["restore", "unlock"]

[step.lock]
run = { builtin = "lock" }
lock_file = "release.lock"

[step.unlock]
run = { builtin = "unlock" }
lock_file = "release.lock"

[step.backup]
run = "sh"
args = '-c "echo backed-up >> trail.log"'
kind = "backup"

[step.deploy]
run = "sh"
args = '-c "echo deploying >> trail.log; exit 1"'

[step.publish]
run = "sh"
args = '-c "echo published >> trail.log"'

[step.restore]
run = "sh"
args = '-c "echo restored >> trail.log"'
kind = "cleanup"
"#;

#[test]
fn failed_release_restores_and_unlocks() {
    let temp = Project::with_runbook(RELEASE_RUNBOOK);

    temp.mf()
        .args(&["run", "-t", "release", "-v", "3.0.0"])
        .fails()
        .stdout_has("[2] deploy failed")
        .stdout_has("[3] restore succeeded")
        .stdout_has("[4] unlock succeeded")
        .stdout_lacks("publish")
        .stdout_has(": failed");

    assert_eq!(temp.read("trail.log"), "backed-up\ndeploying\nrestored\n");
    assert!(!temp.path().join("release.lock").exists());
}

#[test]
fn failed_development_build_does_not_restore() {
    let temp = Project::with_runbook(RELEASE_RUNBOOK);

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "3.0.0"])
        .fails()
        .stdout_has("[1] deploy failed")
        .stdout_has("[2] unlock pending")
        .stdout_lacks("restore");

    // Left locked for an operator to inspect
    assert!(temp.path().join("release.lock").exists());
}

#[test]
fn held_lock_fails_release_and_keeps_foreign_lock() {
    let temp = Project::with_runbook(RELEASE_RUNBOOK);
    temp.file("release.lock", "other-build");

    temp.mf()
        .args(&["run", "-t", "release", "-v", "3.0.0"])
        .fails()
        .stdout_has("[0] lock failed")
        .stdout_has("[1] restore succeeded")
        .stdout_has("[2] unlock skipped");

    assert_eq!(temp.read("release.lock"), "other-build");
}
