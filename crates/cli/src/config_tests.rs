// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn test_init_and_load_config() {
    let temp = TempDir::new().unwrap();
    let work_dir = init_work_dir(temp.path(), &Config::default()).unwrap();

    let config = Config::load(&work_dir).unwrap();
    assert_eq!(config, Config::default());
    assert!(state_dir(&work_dir).is_dir());
    assert!(work_dir.join(".gitignore").exists());
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.channel.max_attempts, 10);
    assert_eq!(config.channel.initial_delay_ms, 100);
    assert_eq!(config.channel.max_delay_secs, 30);
    assert_eq!(config.sync.flush_interval_secs, 30);
    assert_eq!(config.sync.max_attempts, 5);
    assert_eq!(config.sync.settle_ms, 500);
    assert_eq!(config.notifications.cap, 50);
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "").unwrap();
    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_section_fills_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "[channel]\nmax_attempts = 3\n\n[notifications]\ncap = 20\n",
    )
    .unwrap();
    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config.channel.max_attempts, 3);
    assert_eq!(config.channel.max_delay_secs, 30);
    assert_eq!(config.notifications.cap, 20);
    assert_eq!(config.sync, SyncSection::default());
}

#[test]
fn test_already_initialized() {
    let temp = TempDir::new().unwrap();
    init_work_dir(temp.path(), &Config::default()).unwrap();

    let result = init_work_dir(temp.path(), &Config::default());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("already initialized"));
}

#[test]
fn test_init_succeeds_with_empty_tide_dir() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join(".tide");
    std::fs::create_dir_all(&work_dir).unwrap();

    let result = init_work_dir(temp.path(), &Config::default());
    assert!(result.is_ok());
    assert!(work_dir.join("config.toml").exists());
}

#[test]
fn test_config_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let result = Config::load(temp.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_config_load_invalid_toml() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "[remote\n").unwrap();
    let err = Config::load(temp.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn test_config_save_and_reload() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::new(
        "https://api.example.com/batch".to_string(),
        "wss://api.example.com/events".to_string(),
    )
    .unwrap();
    config.sync.flush_interval_secs = 5;
    config.save(temp.path()).unwrap();

    let loaded = Config::load(temp.path()).unwrap();
    assert_eq!(loaded, config);
}

#[parameterized(
    batch_ws = { "ws://x/batch", "ws://x/events", "batch_url" },
    push_http = { "http://x/batch", "http://x/events", "push_url" },
    batch_empty = { "", "ws://x/events", "batch_url" },
)]
fn test_invalid_urls(batch: &str, push: &str, field: &str) {
    let err = Config::new(batch.to_string(), push.to_string()).unwrap_err();
    match err {
        Error::InvalidUrl { field: f, .. } => assert_eq!(f, field),
        other => unreachable!("unexpected error: {}", other),
    }
}

#[parameterized(
    jitter_high = { "[channel]\njitter = 1.5\n", "jitter" },
    jitter_nan = { "[channel]\njitter = nan\n", "jitter" },
    zero_cap = { "[notifications]\ncap = 0\n", "cap" },
)]
fn test_invalid_ranges(content: &str, needle: &str) {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), content).unwrap();
    let err = Config::load(temp.path()).unwrap_err();
    assert!(err.to_string().contains(needle), "{}", err);
}

#[test]
fn test_find_work_dir_walks_up() {
    let temp = TempDir::new().unwrap();
    let work_dir = init_work_dir(temp.path(), &Config::default()).unwrap();
    let nested = temp.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let found = find_work_dir_from(&nested).unwrap();
    assert_eq!(found, work_dir);
}

#[test]
fn test_find_work_dir_not_initialized() {
    let temp = TempDir::new().unwrap();
    let result = find_work_dir_from(temp.path());
    assert!(matches!(result, Err(Error::NotInitialized)));
}

#[test]
fn test_channel_and_sync_config() {
    let config = Config::default();
    let channel = config.channel_config();
    assert_eq!(channel.url, config.remote.push_url);
    assert_eq!(channel.max_attempts, 10);
    assert_eq!(channel.initial_delay, Duration::from_millis(100));
    assert_eq!(channel.max_delay, Duration::from_secs(30));
    assert_eq!(config.sync_config().max_attempts, 5);
    assert_eq!(config.flush_interval(), Duration::from_secs(30));
    assert_eq!(config.settle(), Duration::from_millis(500));
}
