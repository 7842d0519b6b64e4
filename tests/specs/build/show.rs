//! Build show specs
//!
//! Verify stored builds can be printed after a run.

use crate::prelude::*;

const STRUCTURED_RUNBOOK: &str = r#"
[target]
development = ["compile"]

[step.compile]
run = "sh"
args = "emit.sh"
"#;

const EMIT_SCRIPT: &str = r##"echo plain line
echo '##mf{"message":"Mods resolved","colour":"#20d420"}'
"##;

fn structured_project() -> Project {
    let temp = Project::with_runbook(STRUCTURED_RUNBOOK);
    temp.file("emit.sh", EMIT_SCRIPT);
    temp
}

#[test]
fn show_prints_step_logs() {
    let temp = structured_project();
    let run = temp.mf().args(&["run", "-t", "dev", "-v", "1.0.0"]).passes();

    temp.mf()
        .args(&["show", &run.build_id()])
        .passes()
        .stdout_has("Status: succeeded")
        .stdout_has("[0] compile succeeded")
        .stdout_has("plain line")
        .stdout_has("Mods resolved")
        .stdout_lacks("##mf");
}

#[test]
fn show_json_includes_colours() {
    let temp = structured_project();
    let run = temp.mf().args(&["run", "-t", "dev", "-v", "1.0.0"]).passes();

    let shown = temp
        .mf()
        .args(&["show", &run.build_id(), "--format", "json"])
        .passes();
    let record: serde_json::Value = serde_json::from_str(shown.stdout()).unwrap();

    assert_eq!(record["status"], "succeeded");
    let log = record["steps"][0]["log"].as_array().unwrap();
    assert!(log
        .iter()
        .any(|e| e["text"] == "Mods resolved" && e["colour"] == "#20d420"));
}

#[test]
fn show_uses_explicit_state_dir() {
    let temp = Project::with_runbook(SHELL_RUNBOOK);
    let state = temp.path().join("state");
    let state = state.to_str().unwrap();
    let run = temp
        .mf()
        .args(&["run", "-t", "dev", "-v", "1.0.0", "--state-dir", state])
        .passes();

    temp.mf()
        .args(&["show", &run.build_id(), "--state-dir", state])
        .passes()
        .stdout_has("[2] package succeeded");
}
