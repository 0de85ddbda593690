// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Action Queue Client
//!
//! Remote writes that survive being offline. A write is attempted once; if
//! it fails it is persisted and retried by later drain passes until the
//! remote acknowledges it. Delivery is at-least-once and best effort: no
//! failure is ever raised to the caller of `submit`, `drain` or
//! `fetch_with_fallback`.
//!
//! # Modules
//!
//! - [`action`] - queue record and outcome types
//! - [`config`] - configuration (base URL, data directory, drain interval)
//! - [`context`] - application-level owner with start/shutdown lifecycle
//! - [`drain`] - background drain task
//! - [`error`] - error types
//! - [`store`] - queue persistence backends
//!
//! # Example
//!
//! ```no_run
//! use action_queue::{QueueConfig, QueueContext};
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = QueueConfig {
//!     base_url: Some("http://localhost:9091".to_string()),
//!     ..QueueConfig::from_env()?
//! };
//! let mut ctx = QueueContext::new(config)?;
//! ctx.start();
//!
//! let outcome = ctx
//!     .queue()
//!     .submit("/api/tickets", json!({"title": "VPN down", "description": "Cannot connect"}))
//!     .await;
//! if !outcome.is_ok() {
//!     println!("queued for retry");
//! }
//!
//! ctx.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod context;
pub mod drain;
pub mod error;
mod fetch;
mod queue;
pub mod store;

pub use action::{DrainReport, Fetched, QueuedAction, SubmitOutcome};
pub use config::QueueConfig;
pub use context::QueueContext;
pub use drain::DrainTask;
pub use error::{QueueError, StoreError};
pub use fetch::primary_payload;
pub use queue::ActionQueue;
pub use store::{ActionStore, FileStore, MemoryStore, NullStore, QUEUE_KEY};
