// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.tide/config.toml` with four sections:
//! - `[remote]`: batch endpoint and push channel URLs
//! - `[channel]`: push reconnect policy
//! - `[sync]`: flush timer, retry budget and connectivity settle time
//! - `[notifications]`: history cap
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Persisted engine state lives next to it in `.tide/state/`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::sync::{ChannelConfig, SyncConfig};

const WORK_DIR_NAME: &str = ".tide";
const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_DIR_NAME: &str = "state";
const LOG_FILE_NAME: &str = "tide.log";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Project configuration stored in `.tide/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub channel: ChannelSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub notifications: NotificationSection,
}

/// Remote authority endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Batch mutation endpoint (`http://` or `https://`).
    #[serde(default = "default_batch_url")]
    pub batch_url: String,
    /// Push channel (`ws://` or `wss://`).
    #[serde(default = "default_push_url")]
    pub push_url: String,
    /// Timeout for one batch request in seconds (default: 10).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            batch_url: default_batch_url(),
            push_url: default_push_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Push channel reconnect policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSection {
    /// Failed connects before giving up (default: 10). 0 = unlimited.
    #[serde(default = "default_channel_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds (default: 100).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Backoff ceiling in seconds (default: 30).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Relative jitter in `0.0..=1.0` (default: 0.2).
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

impl Default for ChannelSection {
    fn default() -> Self {
        ChannelSection {
            max_attempts: default_channel_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            jitter: default_jitter(),
        }
    }
}

/// Flush policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Periodic flush interval in seconds (default: 30).
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
    /// Rejections tolerated before a mutation is failed permanently
    /// (default: 5).
    #[serde(default = "default_sync_max_attempts")]
    pub max_attempts: u32,
    /// How long connectivity must hold before a transition counts, in
    /// milliseconds (default: 500).
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            flush_interval_secs: default_flush_interval_secs(),
            max_attempts: default_sync_max_attempts(),
            settle_ms: default_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSection {
    /// Records kept before the oldest are evicted (default: 50).
    #[serde(default = "default_notification_cap")]
    pub cap: usize,
}

impl Default for NotificationSection {
    fn default() -> Self {
        NotificationSection {
            cap: default_notification_cap(),
        }
    }
}

fn default_batch_url() -> String {
    "http://localhost:8080/mutations/batch".to_string()
}

fn default_push_url() -> String {
    "ws://localhost:8080/events".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_channel_max_attempts() -> u32 {
    10
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_jitter() -> f64 {
    0.2
}

fn default_flush_interval_secs() -> u64 {
    30
}

fn default_sync_max_attempts() -> u32 {
    5
}

fn default_settle_ms() -> u64 {
    500
}

fn default_notification_cap() -> usize {
    50
}

impl Config {
    /// Creates a config pointing at the given endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if either URL has the wrong scheme.
    pub fn new(batch_url: String, push_url: String) -> Result<Self> {
        let config = Config {
            remote: RemoteConfig {
                batch_url,
                push_url,
                ..RemoteConfig::default()
            },
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the given `.tide/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.tide/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// Checks URL schemes and numeric ranges.
    pub fn validate(&self) -> Result<()> {
        let batch = &self.remote.batch_url;
        if !(batch.starts_with("http://") || batch.starts_with("https://")) {
            return Err(Error::InvalidUrl {
                field: "batch_url",
                url: batch.clone(),
                expected: "http:// or https://",
            });
        }
        let push = &self.remote.push_url;
        if !(push.starts_with("ws://") || push.starts_with("wss://")) {
            return Err(Error::InvalidUrl {
                field: "push_url",
                url: push.clone(),
                expected: "ws:// or wss://",
            });
        }
        if !(0.0..=1.0).contains(&self.channel.jitter) {
            return Err(Error::Config(format!(
                "channel.jitter must be between 0 and 1, got {}",
                self.channel.jitter
            )));
        }
        if self.notifications.cap == 0 {
            return Err(Error::Config(
                "notifications.cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.request_timeout_secs)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.sync.flush_interval_secs.max(1))
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.sync.settle_ms)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_attempts: self.sync.max_attempts,
        }
    }

    pub fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            url: self.remote.push_url.clone(),
            max_attempts: self.channel.max_attempts,
            initial_delay: Duration::from_millis(self.channel.initial_delay_ms),
            max_delay: Duration::from_secs(self.channel.max_delay_secs),
            jitter: self.channel.jitter,
        }
    }
}

/// Find the .tide directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    find_work_dir_from(&std::env::current_dir()?)
}

/// Find the .tide directory by walking up from `start`
pub fn find_work_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Directory holding persisted engine state.
pub fn state_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(STATE_DIR_NAME)
}

/// Path of the log file written by `tide run`.
pub fn log_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOG_FILE_NAME)
}

/// Initialize a new .tide directory at the given path
pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    config.validate()?;
    fs::create_dir_all(state_dir(&work_dir))?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// Engine state and logs are per-machine; the config is shareable.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    let content = "# Per-machine engine state\nstate/\n\n# Logs\ntide.log\n";
    fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
