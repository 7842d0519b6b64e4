// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn parse(toml_src: &str) -> StepDef {
    toml::from_str(toml_src).unwrap()
}

#[test]
fn command_step_defaults() {
    let step = parse(r#"run = "git""#);

    assert_eq!(step.run, RunDirective::Command("git".to_string()));
    assert_eq!(step.timeout, DEFAULT_STEP_TIMEOUT);
    assert!(step.fail_on_stderr);
    assert!(!step.diagnostics);
    assert_eq!(step.category(), StepKind::Work);
}

#[test]
fn builtin_run_directive() {
    let step = parse(
        r#"
run = { builtin = "lock" }
lock_file = "/tmp/release.lock"
"#,
    );

    assert_eq!(step.run.builtin(), Some(BuiltinStep::Lock));
    assert!(!step.run.is_command());
}

#[test]
fn humantime_timeout() {
    let step = parse(
        r#"
run = "sleep"
timeout = "90s"
"#,
    );
    assert_eq!(step.timeout, Duration::from_secs(90));
}

#[test]
fn unlock_defaults_to_cleanup_category() {
    let step = parse(r#"run = { builtin = "unlock" }"#);
    assert_eq!(step.category(), StepKind::Cleanup);
}

#[test]
fn explicit_kind_wins() {
    let step = parse(
        r#"
run = { builtin = "unlock" }
kind = "work"
"#,
    );
    assert_eq!(step.category(), StepKind::Work);

    let backup = parse(
        r#"
run = "rsync"
kind = "backup"
"#,
    );
    assert!(backup.category().is_restorative());
}

#[test]
fn ignore_block_table() {
    let step = parse(
        r#"
run = "packwiz"
ignore_errors = ["deprecated"]
ignore_block = { open = "BEGIN NOISE", close = "END NOISE" }
"#,
    );

    assert_eq!(step.ignore_errors, ["deprecated"]);
    assert_eq!(
        step.ignore_block,
        Some(IgnoreBlock {
            open: "BEGIN NOISE".to_string(),
            close: "END NOISE".to_string(),
        })
    );
}

#[test]
fn unknown_builtin_is_rejected() {
    let result: Result<StepDef, _> = toml::from_str(r#"run = { builtin = "teleport" }"#);
    assert!(result.is_err());
}
