// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use clap::{Parser, Subcommand};
use tide_core::{Category, MutationKind, Priority};

pub use args::{OutputArgs, OutputFormat};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser)]
#[command(name = "tide")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first sync engine: queue changes locally, flush them when online")]
#[command(
    long_about = "Offline-first sync engine.\n\n\
    Mutations are applied locally and queued durably, then flushed to the remote \
    authority in order whenever a connection is available."
)]
pub struct Cli {
    /// Run as if tide was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize tide in the current directory
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(long)]
        path: Option<String>,

        /// Batch mutation endpoint (http:// or https://)
        #[arg(long, value_name = "url")]
        batch_url: Option<String>,

        /// Push channel endpoint (ws:// or wss://)
        #[arg(long, value_name = "url")]
        push_url: Option<String>,
    },

    /// Show queue and notification status
    Status {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Apply a change locally and queue it for the remote
    #[command(after_help = "\
Examples:
  tide mutate create tasks t1 title=\"Pour footing\" done=false
  tide mutate update tasks t1 done=true
  tide mutate delete tasks t1

Field values are parsed as JSON when possible, otherwise kept as strings.")]
    Mutate {
        /// Mutation kind (create, update, delete)
        kind: MutationKind,

        /// Entity collection
        #[arg(value_parser = non_empty_string)]
        collection: String,

        /// Entity id within the collection
        #[arg(value_parser = non_empty_string)]
        entity_id: String,

        /// Fields as name=value
        fields: Vec<String>,
    },

    /// Send queued mutations to the remote now
    Flush,

    /// List, requeue or discard permanently failed mutations
    Failed {
        /// Move a failed mutation back to the queue with a fresh retry budget
        #[arg(long, value_name = "id", conflicts_with = "discard")]
        requeue: Option<String>,

        /// Drop a failed mutation for good
        #[arg(long, value_name = "id")]
        discard: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List notifications, newest first
    Notifications {
        /// Show only unread notifications
        #[arg(long)]
        unread: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Add a local notification
    Notify {
        /// Notification text
        #[arg(value_parser = non_empty_string)]
        message: String,

        /// Category (system, sync, activity, alert)
        #[arg(long, short, default_value = "alert")]
        category: Category,

        /// Priority (low, normal, high, urgent)
        #[arg(long, short, default_value = "normal")]
        priority: Priority,
    },

    /// Mark notifications read
    Read {
        /// Notification ids
        #[arg(required_unless_present = "all")]
        ids: Vec<String>,

        /// Mark every notification read
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },

    /// Remove notifications
    Clear {
        /// Notification ids (default: all)
        ids: Vec<String>,
    },

    /// Run the engine in the foreground until interrupted
    Run,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
