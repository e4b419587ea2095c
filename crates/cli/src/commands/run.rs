// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{open_engine_at, runtime};
use crate::config::{find_work_dir, log_path, Config};
use crate::error::Result;
use crate::sync::{RealtimeChannel, WebSocketTransport};

/// Run the engine and push channel until Ctrl-C.
///
/// Blocks the calling thread. Logs go to `.tide/tide.log`.
pub fn run() -> Result<()> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    crate::logging::init(&log_path(&work_dir));

    let rt = runtime()?;
    rt.block_on(run_async(&work_dir, &config))
}

async fn run_async(work_dir: &Path, config: &Config) -> Result<()> {
    let engine = open_engine_at(work_dir, config)?;
    let cancel = CancellationToken::new();

    let (channel, events) = RealtimeChannel::new(WebSocketTransport::new(), config.channel_config());
    let channel_task = tokio::spawn(channel.run(cancel.clone()));
    let engine_task = tokio::spawn(Arc::clone(&engine).run(events, cancel.clone()));

    println!(
        "tide running: {} pending, batch {}, push {}",
        engine.pending().len(),
        config.remote.batch_url,
        config.remote.push_url
    );
    println!("Press Ctrl-C to stop");
    let _ = std::io::stdout().flush();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    cancel.cancel();

    match channel_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("{}", e),
        Err(e) => tracing::error!("Push channel task failed: {}", e),
    }
    if let Err(e) = engine_task.await {
        tracing::error!("Engine task failed: {}", e);
    }

    let status = engine.status();
    println!(
        "Stopped with {} pending and {} failed mutations",
        status.pending, status.failed
    );
    Ok(())
}
