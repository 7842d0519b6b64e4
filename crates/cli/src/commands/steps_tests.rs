// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mf_runbook::parse_runbook;

const RUNBOOK: &str = r#"
[target]
development = ["pull", "build"]
release = ["lock", "backup", "build"]
restore = ["restore", "unlock"]

[step.pull]
run = "git"
args = "pull"

[step.build]
run = "./gradlew"
args = "build"

[step.backup]
run = "tar"
kind = "backup"

[step.restore]
run = "tar"
kind = "cleanup"

[step.lock]
run = { builtin = "lock" }
lock_file = "release.lock"

[step.unlock]
run = { builtin = "unlock" }
lock_file = "release.lock"
"#;

#[test]
fn development_listing_has_no_restore_section() {
    let runbook = parse_runbook(RUNBOOK).unwrap();
    assert_eq!(
        listing(&runbook, BuildTarget::Development),
        "[0] pull (work)\n[1] build (work)\n"
    );
}

#[test]
fn release_listing_continues_indices_into_restore() {
    let runbook = parse_runbook(RUNBOOK).unwrap();
    assert_eq!(
        listing(&runbook, BuildTarget::Release),
        "[0] lock (work)\n[1] backup (backup)\n[2] build (work)\nOn failure:\n[3] restore (cleanup)\n[4] unlock (cleanup)\n"
    );
}

#[test]
fn empty_target_says_so() {
    let runbook = parse_runbook(RUNBOOK).unwrap();
    assert_eq!(
        listing(&runbook, BuildTarget::ReleaseCandidate),
        "No steps for release_candidate\n"
    );
}
