//! Step listing specs

use crate::prelude::*;

#[test]
fn steps_lists_target_in_order() {
    let temp = Project::with_runbook(SHELL_RUNBOOK);

    temp.mf()
        .args(&["steps", "--target", "development"])
        .passes()
        .stdout_has("[0] fetch (work)\n[1] compile (work)\n[2] package (work)\n");
}

#[test]
fn steps_accepts_runbook_path() {
    let temp = Project::empty();
    temp.file("packs/skyblock.toml", SHELL_RUNBOOK);

    temp.mf()
        .args(&["steps", "-t", "dev", "--runbook", "packs/skyblock.toml"])
        .passes()
        .stdout_has("[1] compile");
}

#[test]
fn steps_for_release_show_restore_list() {
    let temp = Project::with_runbook(
        r#"
[target]
release = ["deploy"]
restore = ["rollback"]

[step.deploy]
run = "true"

[step.rollback]
run = "true"
kind = "cleanup"
"#,
    );

    temp.mf()
        .args(&["steps", "-t", "release"])
        .passes()
        .stdout_has("[0] deploy (work)")
        .stdout_has("On failure:\n[1] rollback (cleanup)");
}
