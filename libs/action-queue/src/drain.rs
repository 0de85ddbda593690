// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Background drain task
//!
//! Runs one drain pass as soon as it starts, then one per interval, until
//! [`DrainTask::shutdown`] is called or the task is dropped. Shutdown takes
//! effect between passes; a pass in flight runs to completion.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::queue::ActionQueue;

/// Handle to a running background drain loop
pub struct DrainTask {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl DrainTask {
    /// Spawn the drain loop for `queue`
    pub fn spawn(queue: ActionQueue, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(drain_loop(queue, interval, shutdown_rx));

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop and wait for it to exit
    pub async fn shutdown(mut self) {
        // Intentionally ignore send error - the loop may already be gone
        let _ = self.shutdown_tx.send(true);

        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Drain task join error");
        }
    }
}

impl Drop for DrainTask {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn drain_loop(queue: ActionQueue, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    info!(interval_secs = interval.as_secs(), "Background drain started");

    let mut ticker = tokio::time::interval(interval);
    // Passes are not stacked up after a slow drain
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // The first tick completes immediately
            _ = ticker.tick() => {
                let report = queue.drain().await;
                debug!(
                    attempted = report.attempted,
                    delivered = report.delivered,
                    remaining = report.remaining,
                    "Background drain pass complete"
                );
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    info!("Background drain stopped");
}
