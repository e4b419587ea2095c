// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn parse_dash_c_before_subcommand() {
    let cli = Cli::try_parse_from(["tide", "-C", "/tmp", "status"]).unwrap();
    assert_eq!(cli.directory, Some("/tmp".to_string()));
}

#[test]
fn parse_dash_c_after_subcommand() {
    let cli = Cli::try_parse_from(["tide", "flush", "--directory", "/tmp"]).unwrap();
    assert_eq!(cli.directory, Some("/tmp".to_string()));
    assert!(matches!(cli.command, Command::Flush));
}

#[test]
fn parse_init_urls() {
    let cli = Cli::try_parse_from([
        "tide",
        "init",
        "--batch-url",
        "https://api.example.com/batch",
        "--push-url",
        "wss://api.example.com/events",
    ])
    .unwrap();
    match cli.command {
        Command::Init {
            path,
            batch_url,
            push_url,
        } => {
            assert!(path.is_none());
            assert_eq!(batch_url.as_deref(), Some("https://api.example.com/batch"));
            assert_eq!(push_url.as_deref(), Some("wss://api.example.com/events"));
        }
        _ => unreachable!("expected Init command"),
    }
}
