//! Help and version output.

use crate::prelude::*;

#[test]
fn help_describes_the_run_command() {
    cli().args(&["--help"]).passes().stdout_has("run").stdout_has("supervisor");
}

#[test]
fn version_flag_prints_a_version() {
    cli().args(&["--version"]).passes().stdout_has("protea");
}

#[test]
fn missing_subcommand_fails_with_usage() {
    cli().args(&[]).fails().stderr_has("Usage");
}

#[test]
fn unknown_subcommand_fails() {
    cli().args(&["bogus"]).fails();
}
