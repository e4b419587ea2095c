// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn tide() -> Command {
    cargo_bin_cmd!("tide")
}

/// Create an initialized temp directory with default endpoints.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    tide()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Create an initialized temp directory posting batches to `batch_url`.
pub fn init_temp_with_batch_url(batch_url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    tide()
        .args(["init", "--batch-url", batch_url])
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Queue an update of `tasks/<entity>` and return the mutation id.
pub fn queue_update(temp: &TempDir, entity: &str) -> String {
    let output = tide()
        .args(["mutate", "update", "tasks", entity])
        .arg(format!("title={}", entity))
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find_map(|line| line.strip_prefix("Mutation id: "))
        .unwrap()
        .trim()
        .to_string()
}

/// Parse stdout of a `-o json` invocation.
pub fn json_output(temp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = tide()
        .args(args)
        .args(["-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}
