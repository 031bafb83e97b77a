//! Behavioral specifications for the `protea` CLI.
//!
//! These tests are black-box: they invoke the `protea` binary and verify
//! stdout, stderr, exit codes, and on-disk effects (the heartbeat file,
//! worker process liveness). No test drives the evolution step directly —
//! that would require a real Claude API round trip.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// supervisor/
#[path = "specs/supervisor/lifecycle.rs"]
mod supervisor_lifecycle;
