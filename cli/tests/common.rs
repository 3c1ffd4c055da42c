//! # scaffoldsrv Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file is
//! compiled as its own crate and runs the built `scaffoldsrv` binary.

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// # Get scaffoldsrv Command (`scaffoldsrv_cmd`)
///
/// An `assert_cmd::Command` for the compiled binary, with `SCAFFOLDSRV_TOOL`
/// cleared so the host environment cannot leak into tests.
///
/// ## Panics
/// Panics if the `scaffoldsrv` binary cannot be found via `Command::cargo_bin`.
pub fn scaffoldsrv_cmd() -> Command {
    let mut cmd = Command::cargo_bin("scaffoldsrv").expect("Failed to find scaffoldsrv binary for testing");
    cmd.env_remove("SCAFFOLDSRV_TOOL").env_remove("RUST_LOG");
    cmd
}

/// Writes an executable shell script standing in for the external tool.
#[cfg(unix)]
pub fn write_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-dotnet");
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    path
}

/// A `new --list` listing with two templates.
pub const LISTING: &str = "\
Template Name        Short Name  Language    Tags
-------------------  ----------  ----------  --------------
Console Application  console     [C#],F#,VB  Common/Console
Class Library        classlib    [C#],F#,VB  Common/Library
";
