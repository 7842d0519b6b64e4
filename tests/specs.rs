//! Behavioral specifications for the mf CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// build/
#[path = "specs/build/restore.rs"]
mod build_restore;
#[path = "specs/build/run.rs"]
mod build_run;
#[path = "specs/build/show.rs"]
mod build_show;
#[path = "specs/build/steps.rs"]
mod build_steps;
