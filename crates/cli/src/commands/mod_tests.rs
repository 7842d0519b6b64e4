// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_key_val_splits_on_first_equals() {
    assert_eq!(
        parse_key_val("JAVA_OPTS=-Xmx4G -Dfoo=bar").unwrap(),
        ("JAVA_OPTS".to_string(), "-Xmx4G -Dfoo=bar".to_string())
    );
    assert_eq!(
        parse_key_val("EMPTY=").unwrap(),
        ("EMPTY".to_string(), String::new())
    );
}

#[test]
fn parse_key_val_rejects_malformed_pairs() {
    assert!(parse_key_val("novalue").is_err());
    assert!(parse_key_val("=value").is_err());
}

#[test]
fn state_dir_defaults_under_runbook_dir() {
    assert_eq!(
        state_dir(Path::new("/srv/pack"), None),
        PathBuf::from("/srv/pack/.mf/builds")
    );
    assert_eq!(
        state_dir(Path::new("/srv/pack"), Some(PathBuf::from("/tmp/state"))),
        PathBuf::from("/tmp/state")
    );
}

#[test]
fn open_runbook_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_runbook(Some(&dir.path().join("missing.toml"))).unwrap_err();
    assert!(err.to_string().contains("loading runbook"));
}
