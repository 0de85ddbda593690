// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Application-level owner of the queue and its background drain

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::QueueConfig;
use crate::drain::DrainTask;
use crate::queue::ActionQueue;
use crate::store::{ActionStore, FileStore};

/// Owns an [`ActionQueue`] and, once started, the [`DrainTask`] that keeps
/// retrying it
pub struct QueueContext {
    config: QueueConfig,
    queue: ActionQueue,
    drain_task: Option<DrainTask>,
}

impl QueueContext {
    /// Create a context persisting its queue under `config.data_dir`
    pub fn new(config: QueueConfig) -> Result<Self> {
        let store = Arc::new(FileStore::in_dir(&config.data_dir));
        Self::with_store(config, store)
    }

    pub fn with_store(config: QueueConfig, store: Arc<dyn ActionStore>) -> Result<Self> {
        let queue =
            ActionQueue::with_store(&config, store).context("Failed to create action queue")?;

        Ok(Self {
            config,
            queue,
            drain_task: None,
        })
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Start background draining
    ///
    /// Does nothing when the store is not durable or the task is already
    /// running. Returns whether a drain task is running afterwards.
    pub fn start(&mut self) -> bool {
        if self.drain_task.is_some() {
            return true;
        }
        if !self.queue.is_durable() {
            info!("Store is not durable, background drain disabled");
            return false;
        }

        self.drain_task = Some(DrainTask::spawn(
            self.queue.clone(),
            self.config.drain_interval(),
        ));
        true
    }

    pub fn is_draining(&self) -> bool {
        self.drain_task.as_ref().is_some_and(DrainTask::is_running)
    }

    /// Stop background draining and wait for the task to exit
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.drain_task.take() {
            task.shutdown().await;
        }
    }
}
