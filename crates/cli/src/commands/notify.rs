// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tide_core::{Category, NewNotification, Priority};

use super::open_engine;
use crate::error::Result;
use crate::notifications::AddOutcome;

pub fn run(message: &str, category: Category, priority: Priority) -> Result<()> {
    let (engine, _, _) = open_engine()?;
    let outcome = engine.notify(NewNotification::new(category, message).with_priority(priority));
    if let AddOutcome::Added { evicted } = outcome {
        if evicted > 0 {
            println!("Evicted {} oldest notifications", evicted);
        }
    }
    println!("Added notification ({} unread)", engine.unread_count());
    Ok(())
}
