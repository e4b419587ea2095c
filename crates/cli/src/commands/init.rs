// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::config::{init_work_dir, Config, RemoteConfig};
use crate::error::Result;

pub fn run(path: Option<String>, batch_url: Option<String>, push_url: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let config = build_config(batch_url, push_url)?;
    let work_dir = init_work_dir(&target_path, &config)?;

    println!("Initialized tide at {}", work_dir.display());
    println!("Batch endpoint: {}", config.remote.batch_url);
    println!("Push channel: {}", config.remote.push_url);
    Ok(())
}

/// Config for `init`, with unspecified endpoints left at their defaults.
pub(crate) fn build_config(batch_url: Option<String>, push_url: Option<String>) -> Result<Config> {
    let defaults = RemoteConfig::default();
    Config::new(
        batch_url.unwrap_or(defaults.batch_url),
        push_url.unwrap_or(defaults.push_url),
    )
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
