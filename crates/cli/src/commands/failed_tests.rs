// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use crate::error::Error;
use crate::sync::{QueueError, SyncError};

fn failed_context() -> (TestContext, MutationId) {
    let ctx = TestContext::with_max_attempts(0);
    let id = ctx.queue_update("t1");
    ctx.flush_rejecting(&["t1"]);
    (ctx, id)
}

#[test]
fn test_list_empty() {
    let ctx = TestContext::new();
    let lines = run_impl(&ctx.engine, None, None, OutputFormat::Text).unwrap();
    assert_eq!(lines, vec!["No failed mutations"]);
}

#[test]
fn test_list_text() {
    let (ctx, id) = failed_context();
    let lines = run_impl(&ctx.engine, None, None, OutputFormat::Text).unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&format!("- {} update tasks/t1", id)));
    assert!(lines[0].ends_with("mock rejection"));
}

#[test]
fn test_list_json() {
    let (ctx, id) = failed_context();
    let lines = run_impl(&ctx.engine, None, None, OutputFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed[0]["mutation"]["id"], id.as_str());
    assert_eq!(parsed[0]["reason"], "mock rejection");
}

#[test]
fn test_requeue() {
    let (ctx, id) = failed_context();
    let lines = run_impl(&ctx.engine, Some(id.to_string()), None, OutputFormat::Text).unwrap();
    assert_eq!(lines[0], "Requeued:");
    assert!(ctx.engine.failed().is_empty());
    assert_eq!(ctx.engine.pending()[0].attempts, 0);
}

#[test]
fn test_discard() {
    let (ctx, id) = failed_context();
    let lines = run_impl(&ctx.engine, None, Some(id.to_string()), OutputFormat::Text).unwrap();
    assert_eq!(lines, vec![format!("Discarded {}", id)]);
    assert!(ctx.engine.failed().is_empty());
    assert!(ctx.engine.pending().is_empty());
}

#[test]
fn test_requeue_unknown_id() {
    let ctx = TestContext::new();
    let err = run_impl(&ctx.engine, Some("nope".to_string()), None, OutputFormat::Text)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Sync(SyncError::Queue(QueueError::NotFound(_)))
    ));
}
