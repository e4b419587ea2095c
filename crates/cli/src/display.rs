// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tide_core::{Mutation, NotificationRecord};

use crate::sync::{FailedMutation, FlushReport};

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Render fields as `name=value`, strings unquoted.
pub fn format_fields(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(name, value)| match value {
            Value::String(s) => format!("{}={}", name, s),
            other => format!("{}={}", name, other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a single queued mutation line.
///
/// ```text
/// - update tasks/t1 title=Pour (0193…) attempts: 1, last error: stale
/// ```
pub fn format_mutation_line(mutation: &Mutation) -> String {
    let (collection, entity_id) = mutation.target();
    let mut line = format!("- {} {}/{}", mutation.kind, collection, entity_id);
    if !mutation.payload.fields.is_empty() {
        line.push(' ');
        line.push_str(&format_fields(&mutation.payload.fields));
    }
    line.push_str(&format!(" ({})", mutation.id));
    if mutation.attempts > 0 {
        line.push_str(&format!(" attempts: {}", mutation.attempts));
    }
    if let Some(error) = &mutation.last_error {
        line.push_str(&format!(", last error: {}", error));
    }
    line
}

/// Format a permanently failed mutation.
pub fn format_failed_line(failed: &FailedMutation) -> String {
    let (collection, entity_id) = failed.mutation.target();
    format!(
        "- {} {} {}/{} failed {}: {}",
        failed.mutation.id,
        failed.mutation.kind,
        collection,
        entity_id,
        format_time(&failed.failed_at),
        failed.reason
    )
}

/// Format a notification line, with a marker for unread records.
pub fn format_notification_line(record: &NotificationRecord) -> String {
    let marker = if record.read { " " } else { "*" };
    format!(
        "{} {} [{}/{}] {} ({})",
        marker,
        format_time(&record.created_at),
        record.category,
        record.priority,
        record.message,
        record.id
    )
}

/// Summarize a completed flush.
pub fn format_flush_report(report: &FlushReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Flushed: {} applied, {} rejected, {} failed permanently",
        report.applied.len(),
        report.rejected.len(),
        report.permanently_failed.len()
    )];
    if report.unacknowledged > 0 {
        lines.push(format!(
            "{} mutations had no result and stay queued",
            report.unacknowledged
        ));
    }
    for failed in &report.permanently_failed {
        lines.push(format_failed_line(failed));
    }
    lines
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
