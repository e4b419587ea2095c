// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn parse_notifications_unread_json() {
    let cli = Cli::try_parse_from(["tide", "notifications", "--unread", "-o", "json"]).unwrap();
    match cli.command {
        Command::Notifications { unread, output } => {
            assert!(unread);
            assert_eq!(output.output, OutputFormat::Json);
        }
        _ => unreachable!("expected Notifications command"),
    }
}

#[test]
fn parse_notify_defaults() {
    let cli = Cli::try_parse_from(["tide", "notify", "Inspection moved"]).unwrap();
    match cli.command {
        Command::Notify {
            message,
            category,
            priority,
        } => {
            assert_eq!(message, "Inspection moved");
            assert_eq!(category, Category::Alert);
            assert_eq!(priority, Priority::Normal);
        }
        _ => unreachable!("expected Notify command"),
    }
}

#[test]
fn parse_notify_rejects_unknown_priority() {
    assert!(Cli::try_parse_from(["tide", "notify", "x", "--priority", "meh"]).is_err());
}

#[test]
fn parse_read_requires_ids_or_all() {
    assert!(Cli::try_parse_from(["tide", "read"]).is_err());
    assert!(Cli::try_parse_from(["tide", "read", "--all"]).is_ok());
    assert!(Cli::try_parse_from(["tide", "read", "n-1", "--all"]).is_err());

    let cli = Cli::try_parse_from(["tide", "read", "n-1", "n-2"]).unwrap();
    match cli.command {
        Command::Read { ids, all } => {
            assert_eq!(ids, vec!["n-1", "n-2"]);
            assert!(!all);
        }
        _ => unreachable!("expected Read command"),
    }
}

#[test]
fn parse_clear_without_ids() {
    let cli = Cli::try_parse_from(["tide", "clear"]).unwrap();
    assert!(matches!(cli.command, Command::Clear { ids } if ids.is_empty()));
}
