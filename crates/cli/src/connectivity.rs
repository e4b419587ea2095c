// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline tracking.
//!
//! The monitor holds the current [`ConnectivityState`] in a watch channel.
//! Setting the same state twice never wakes subscribers. Subscribers read
//! transitions through [`ConnectivityWatch`], which waits for the state to
//! stay unchanged for a settle interval before reporting, so a flapping link
//! produces at most one transition per stable period.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

/// Current connectivity as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectivityState {
    pub is_online: bool,
}

/// A settled change in connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Online,
    Offline,
}

/// Tracks transitions between online and offline.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<ConnectivityState>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(ConnectivityState {
            is_online: initially_online,
        });
        ConnectivityMonitor { tx }
    }

    /// Returns the current state.
    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online
    }

    /// Records the current connectivity.
    ///
    /// Returns true if this changed the state. Same-state updates are
    /// dropped without notifying subscribers.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|state| {
            if state.is_online == online {
                return false;
            }
            state.is_online = online;
            true
        });
        if changed {
            tracing::debug!("Connectivity changed: online={}", online);
        }
        changed
    }

    /// Subscribes to settled transitions.
    pub fn subscribe(&self, settle: Duration) -> ConnectivityWatch {
        let rx = self.tx.subscribe();
        let last = rx.borrow().is_online;
        ConnectivityWatch { rx, last, settle }
    }
}

/// Receiver side of [`ConnectivityMonitor`].
#[derive(Debug)]
pub struct ConnectivityWatch {
    rx: watch::Receiver<ConnectivityState>,
    /// Last state reported to the subscriber.
    last: bool,
    settle: Duration,
}

impl ConnectivityWatch {
    /// Waits for the next settled transition.
    ///
    /// Returns `None` once the monitor has been dropped. Cancel safe: a
    /// change that was not yet reported is picked up by the next call.
    pub async fn next(&mut self) -> Option<Transition> {
        loop {
            if self.rx.borrow_and_update().is_online == self.last {
                self.rx.changed().await.ok()?;
            }

            // Restart the settle window on every further change
            while !self.settle.is_zero() {
                match tokio::time::timeout(self.settle, self.rx.changed()).await {
                    Ok(Ok(())) => continue,
                    Ok(Err(_)) => return None,
                    Err(_) => break,
                }
            }

            let online = self.rx.borrow_and_update().is_online;
            if online != self.last {
                self.last = online;
                tracing::info!(
                    "Connectivity settled: {}",
                    if online { "online" } else { "offline" }
                );
                return Some(if online {
                    Transition::Online
                } else {
                    Transition::Offline
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
