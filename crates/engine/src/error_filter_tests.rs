// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

fn gated() -> ErrorFilter {
    ErrorFilter::new(["warn:"]).with_block("START", "END")
}

#[test]
fn gate_sequence() {
    let mut filter = gated();
    let decisions: Vec<bool> = ["a", "STARTb", "warn:c", "END", "warn:d"]
        .iter()
        .map(|line| filter.should_ignore_error(line))
        .collect();

    assert_eq!(decisions, [false, true, true, true, false]);
}

#[parameterized(
    empty = { "", true },
    plain_error = { "error: missing texture", false },
    exact_case = { "warn: deprecated api", true },
    upper_case = { "WARN: deprecated api", true },
    mid_line = { "[12:00] Warn: slow tick", true },
)]
fn exclusion_matching(line: &str, ignored: bool) {
    let mut filter = ErrorFilter::new(["Warn:"]);
    assert_eq!(filter.should_ignore_error(line), ignored);
}

#[test]
fn block_without_close_ignores_rest() {
    let mut filter = gated();
    assert!(filter.should_ignore_error("START noise"));
    assert!(filter.is_ignoring());
    assert!(filter.should_ignore_error("fatal: anything"));
    assert!(filter.should_ignore_error("fatal: anything else"));
}

#[test]
fn close_marker_wins_over_open_on_same_line() {
    let mut filter = gated();
    assert!(filter.should_ignore_error("START"));
    assert!(filter.should_ignore_error("END then START"));
    assert!(!filter.is_ignoring());
    assert!(!filter.should_ignore_error("real failure"));
}

#[test]
fn reset_leaves_ignoring_mode() {
    let mut filter = gated();
    filter.should_ignore_error("START");
    filter.reset();
    assert!(!filter.is_ignoring());
    assert!(!filter.should_ignore_error("real failure"));
}

#[test]
fn for_step_uses_definition() {
    let mut def = StepDef::command("build", "packwiz");
    def.ignore_errors = vec!["deprecated".to_string()];
    def.ignore_block = Some(IgnoreBlock {
        open: "<<".to_string(),
        close: ">>".to_string(),
    });

    let mut filter = ErrorFilter::for_step(&def);
    assert!(filter.should_ignore_error("DEPRECATED call"));
    assert!(filter.should_ignore_error("<<"));
    assert!(filter.should_ignore_error("inside"));
    assert!(filter.should_ignore_error(">>"));
    assert!(!filter.should_ignore_error("outside"));
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("START".to_string()),
        Just("END".to_string()),
        Just("warn: x".to_string()),
        "[a-z ]{0,12}",
    ]
}

proptest! {
    #[test]
    fn reset_then_replay_matches_fresh_filter(
        warmup in proptest::collection::vec(line_strategy(), 0..16),
        lines in proptest::collection::vec(line_strategy(), 0..16),
    ) {
        let mut reused = gated();
        for line in &warmup {
            reused.should_ignore_error(line);
        }
        reused.reset();

        let mut fresh = gated();
        let replayed: Vec<bool> = lines.iter().map(|l| reused.should_ignore_error(l)).collect();
        let expected: Vec<bool> = lines.iter().map(|l| fresh.should_ignore_error(l)).collect();
        prop_assert_eq!(replayed, expected);
    }
}
