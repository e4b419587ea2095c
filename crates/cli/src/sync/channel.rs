// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnecting push channel.
//!
//! The channel moves through `Disconnected → Connecting → Connected`. A drop
//! returns it to `Disconnected` and schedules a reconnect after
//! `min(initial × 2^attempts, max)` with jitter. Each failed connect counts
//! one attempt; a successful connect resets the count. Once the attempt
//! budget is spent the channel stops in [`ChannelStatus::GaveUp`] and no
//! further timers are scheduled.
//!
//! Decoded events are delivered on an mpsc channel as [`ChannelEvent`]s, and
//! the current [`ChannelState`] is published on a watch channel.

use std::time::Duration;

use rand::Rng;
use tide_core::PushEvent;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::transport::PushTransport;

/// Error type for channel operations.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("push channel gave up after {attempts} connection attempts")]
    ReconnectExhausted { attempts: u32 },
}

/// Configuration for the push channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// URL to connect to.
    pub url: String,
    /// Failed connects before giving up (0 = unlimited).
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub initial_delay: Duration,
    /// Ceiling for the backoff delay.
    pub max_delay: Duration,
    /// Relative jitter applied to each delay, in `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:7890/events".to_string(),
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Disconnected,
    Connecting,
    Connected,
    /// Reconnect budget exhausted. Terminal.
    GaveUp,
}

impl std::fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChannelStatus::Disconnected => "disconnected",
            ChannelStatus::Connecting => "connecting",
            ChannelStatus::Connected => "connected",
            ChannelStatus::GaveUp => "gave up",
        };
        f.write_str(s)
    }
}

/// Observable channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pub status: ChannelStatus,
    pub reconnect_attempts: u32,
}

impl ChannelState {
    pub fn connected(&self) -> bool {
        self.status == ChannelStatus::Connected
    }
}

/// Events delivered to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    Push(PushEvent),
    GaveUp { attempts: u32 },
}

/// Backoff delay before the next connect, without jitter.
pub fn backoff_delay(attempts: u32, initial: Duration, max: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempts).unwrap_or(u32::MAX);
    initial.checked_mul(factor).map_or(max, |d| d.min(max))
}

fn with_jitter(delay: Duration, jitter: f64, max: Duration) -> Duration {
    if !jitter.is_finite() || jitter <= 0.0 {
        return delay;
    }
    let jitter = jitter.min(1.0);
    let spread = rand::thread_rng().gen_range(-jitter..=jitter);
    delay.mul_f64(1.0 + spread).min(max)
}

enum PumpEnd {
    Cancelled,
    Dropped,
}

/// Push channel driving a [`PushTransport`].
pub struct RealtimeChannel<T: PushTransport> {
    transport: T,
    config: ChannelConfig,
    state_tx: watch::Sender<ChannelState>,
    event_tx: mpsc::Sender<ChannelEvent>,
}

impl<T: PushTransport> RealtimeChannel<T> {
    /// Create a channel.
    ///
    /// Returns the channel and a receiver for its events.
    pub fn new(transport: T, config: ChannelConfig) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (event_tx, event_rx) = mpsc::channel(64);
        let (state_tx, _) = watch::channel(ChannelState {
            status: ChannelStatus::Disconnected,
            reconnect_attempts: 0,
        });
        let channel = RealtimeChannel {
            transport,
            config,
            state_tx,
            event_tx,
        };
        (channel, event_rx)
    }

    pub fn state(&self) -> ChannelState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn watch(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, status: ChannelStatus, reconnect_attempts: u32) {
        self.state_tx.send_replace(ChannelState {
            status,
            reconnect_attempts,
        });
    }

    /// Run until cancelled or the reconnect budget is spent.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), ChannelError> {
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.set_state(ChannelStatus::Connecting, attempts);
            let url = self.config.url.clone();
            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.transport.connect(&url) => result,
            };

            match result {
                Ok(()) => {
                    attempts = 0;
                    self.set_state(ChannelStatus::Connected, 0);
                    tracing::info!("Push channel connected to {}", self.config.url);
                    if self.event_tx.send(ChannelEvent::Connected).await.is_err() {
                        break;
                    }

                    let end = self.pump(&cancel).await;
                    if let Err(e) = self.transport.disconnect().await {
                        tracing::debug!("Push disconnect error: {}", e);
                    }
                    if matches!(end, PumpEnd::Cancelled) {
                        break;
                    }

                    self.set_state(ChannelStatus::Disconnected, 0);
                    tracing::warn!("Push channel disconnected, reconnecting");
                    if self.event_tx.send(ChannelEvent::Disconnected).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    attempts = attempts.saturating_add(1);
                    self.set_state(ChannelStatus::Disconnected, attempts);

                    if self.config.max_attempts > 0 && attempts >= self.config.max_attempts {
                        self.set_state(ChannelStatus::GaveUp, attempts);
                        tracing::error!(
                            "Push channel gave up after {} attempts: {}",
                            attempts,
                            e
                        );
                        if self
                            .event_tx
                            .send(ChannelEvent::GaveUp { attempts })
                            .await
                            .is_err()
                        {
                            tracing::debug!("Give-up event dropped, receiver closed");
                        }
                        return Err(ChannelError::ReconnectExhausted { attempts });
                    }

                    tracing::warn!(
                        "Push connect failed (attempt {}/{}): {}",
                        attempts,
                        self.config.max_attempts,
                        e
                    );
                }
            }

            let delay = with_jitter(
                backoff_delay(attempts, self.config.initial_delay, self.config.max_delay),
                self.config.jitter,
                self.config.max_delay,
            );
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let attempts = self.state().reconnect_attempts;
        self.set_state(ChannelStatus::Disconnected, attempts);
        Ok(())
    }

    /// Forward frames until the connection drops or the run is cancelled.
    async fn pump(&mut self, cancel: &CancellationToken) -> PumpEnd {
        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => return PumpEnd::Cancelled,
                frame = self.transport.recv() => frame,
            };

            let text = match frame {
                Ok(Some(text)) => text,
                Ok(None) => return PumpEnd::Dropped,
                Err(e) => {
                    tracing::warn!("Push channel error: {}", e);
                    return PumpEnd::Dropped;
                }
            };

            match PushEvent::from_json(&text) {
                Ok(Some(event)) => {
                    if self.event_tx.send(ChannelEvent::Push(event)).await.is_err() {
                        return PumpEnd::Cancelled;
                    }
                }
                Ok(None) => tracing::debug!("Ignoring unknown push event: {}", text),
                Err(e) => tracing::warn!("Ignoring malformed push frame: {}", e),
            }
        }
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
