//! Build run specs
//!
//! Verify `mf run` drives steps in order and reports the outcome.

use crate::prelude::*;

#[test]
fn successful_build_reports_each_step() {
    let temp = Project::with_runbook(SHELL_RUNBOOK);

    temp.mf()
        .args(&["run", "--target", "development", "--version", "1.2.0"])
        .passes()
        .stdout_has("[0] fetch succeeded")
        .stdout_has("[1] compile succeeded")
        .stdout_has("[2] package succeeded")
        .stdout_has(": succeeded");

    assert_eq!(temp.read("out.log"), "compiled\npackaged\n");
}

#[test]
fn build_snapshot_is_written_to_state_dir() {
    let temp = Project::with_runbook(SHELL_RUNBOOK);

    let run = temp
        .mf()
        .args(&["run", "-t", "dev", "-v", "1.2.0"])
        .passes();

    let snapshot = temp.state_path().join(format!("{}.json", run.build_id()));
    assert!(snapshot.exists(), "missing {}", snapshot.display());
}

#[test]
fn failing_step_fails_build_and_stops() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["compile", "package"]

[step.compile]
run = "sh"
args = '-c "exit 3"'

[step.package]
run = "sh"
args = '-c "echo packaged >> out.log"'
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0"])
        .fails()
        .stdout_has("[0] compile failed")
        .stdout_has("[1] package pending")
        .stdout_has(": failed");

    assert!(!temp.path().join("out.log").exists());
}

#[test]
fn ignored_stderr_does_not_fail_the_step() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["compile"]

[step.compile]
run = "sh"
args = '-c "echo WARNING: deprecated API >&2"'
ignore_errors = ["warning:"]
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0"])
        .passes()
        .stdout_has("[0] compile succeeded");
}

#[test]
fn unignored_stderr_fails_the_step() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["compile"]

[step.compile]
run = "sh"
args = '-c "echo boom >&2"'
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0"])
        .fails()
        .stdout_has("[0] compile failed");
}

#[test]
fn captured_output_feeds_later_steps() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["describe", "publish"]

[step.describe]
run = "sh"
args = '-c "echo v{version}-abc123"'
capture = "ARTIFACT"

[step.publish]
run = "sh"
args = '-c "echo {ARTIFACT} > published.txt"'
requires = ["ARTIFACT"]
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "2.0.0"])
        .passes()
        .stdout_has("[1] publish succeeded");

    assert_eq!(temp.read("published.txt"), "v2.0.0-abc123\n");
}

#[test]
fn step_with_missing_requirement_is_skipped() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["publish", "package"]

[step.publish]
run = "sh"
args = '-c "echo published > published.txt"'
requires = ["CURSEFORGE_TOKEN"]

[step.package]
run = "sh"
args = '-c "true"'
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0"])
        .passes()
        .stdout_has("[0] publish skipped")
        .stdout_has("[1] package succeeded");

    assert!(!temp.path().join("published.txt").exists());
}

#[test]
fn env_flag_satisfies_requirements() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["publish"]

[step.publish]
run = "sh"
args = '-c "echo $MODPACK_NAME > published.txt"'
requires = ["MODPACK_NAME"]
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0", "--env", "MODPACK_NAME=skyblock"])
        .passes()
        .stdout_has("[0] publish succeeded");

    assert_eq!(temp.read("published.txt"), "skyblock\n");
}

#[test]
fn timed_out_step_fails_build() {
    let temp = Project::with_runbook(
        r#"
[target]
development = ["compile"]

[step.compile]
run = "sleep"
args = "5"
timeout = "100ms"
"#,
    );

    temp.mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0"])
        .fails()
        .stdout_has("[0] compile failed");
}
