// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Remote write client with an offline retry queue
//!
//! [`ActionQueue::submit`] makes exactly one POST attempt. If it fails for
//! any reason the write is appended to the persisted queue and the caller
//! gets [`SubmitOutcome::Queued`]; nothing is raised. [`ActionQueue::drain`]
//! walks the queue oldest first, one request at a time, and drops the
//! entries the remote acknowledged.
//!
//! Store access is serialized inside the process: appends and the final
//! write of a drain pass hold the store lock, and drain passes hold the
//! drain lock for their whole duration. A pass removes the entries it
//! delivered from whatever the store holds when it finishes, so a write
//! queued while the pass was in flight is kept.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::action::{DrainReport, QueuedAction, SubmitOutcome};
use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::store::{ActionStore, FileStore};

/// Client for remote writes backed by an offline queue
///
/// Cheap to clone; clones share the HTTP client, the store and the locks.
#[derive(Clone)]
pub struct ActionQueue {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base_url: Option<Url>,
    store: Arc<dyn ActionStore>,
    store_lock: Mutex<()>,
    drain_lock: Mutex<()>,
    drain_after_submit: bool,
}

impl ActionQueue {
    /// Create a queue persisted in `config.data_dir`
    pub fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        let store = Arc::new(FileStore::in_dir(&config.data_dir));
        Self::with_store(config, store)
    }

    /// Create a queue on top of an arbitrary store
    pub fn with_store(
        config: &QueueConfig,
        store: Arc<dyn ActionStore>,
    ) -> Result<Self, QueueError> {
        install_crypto_provider();

        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let base_url = config
            .base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| QueueError::Endpoint {
                    endpoint: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                store,
                store_lock: Mutex::new(()),
                drain_lock: Mutex::new(()),
                drain_after_submit: config.drain_after_submit,
            }),
        })
    }

    /// Whether queued writes survive a restart
    pub fn is_durable(&self) -> bool {
        self.inner.store.is_durable()
    }

    /// Attempt a remote write once, queueing it on failure
    ///
    /// On success a drain pass is started in the background (unless
    /// disabled in the configuration); its outcome does not affect the
    /// returned value.
    pub async fn submit(&self, endpoint: &str, payload: serde_json::Value) -> SubmitOutcome {
        match self.post_for_body(endpoint, &payload).await {
            Ok(body) => {
                debug!(endpoint = %endpoint, "Write delivered");
                if self.inner.drain_after_submit {
                    let queue = self.clone();
                    tokio::spawn(async move {
                        queue.drain().await;
                    });
                }
                SubmitOutcome::Delivered(body)
            }
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "Write failed, queueing for retry");
                self.enqueue(QueuedAction::new(endpoint, payload)).await;
                SubmitOutcome::Queued
            }
        }
    }

    /// Make one delivery attempt for every queued write
    ///
    /// Acknowledged entries are removed; the rest stay in their original
    /// order. The resulting queue is always written back, even when nothing
    /// changed. Store failures are logged and treated as an empty queue.
    pub async fn drain(&self) -> DrainReport {
        let _pass = self.inner.drain_lock.lock().await;

        let snapshot = {
            let _guard = self.inner.store_lock.lock().await;
            self.load_or_empty().await
        };
        if snapshot.is_empty() {
            return DrainReport::default();
        }

        let mut delivered: Vec<&QueuedAction> = Vec::new();
        for action in &snapshot {
            match self.post(&action.endpoint, &action.payload).await {
                Ok(_) => delivered.push(action),
                Err(e) => {
                    debug!(
                        endpoint = %action.endpoint,
                        created_at = %action.created_at,
                        error = %e,
                        "Queued write still failing"
                    );
                }
            }
        }

        let _guard = self.inner.store_lock.lock().await;
        // A failed reload must not lose the entries this pass kept
        let current = match self.inner.store.load().await {
            Ok(current) => current,
            Err(e) => {
                warn!(error = %e, "Failed to reload queue after drain pass");
                snapshot.clone()
            }
        };
        let residual = remove_delivered(current, &delivered);
        if let Err(e) = self.inner.store.save(&residual).await {
            warn!(error = %e, "Failed to persist queue after drain pass");
        }

        let report = DrainReport {
            attempted: snapshot.len(),
            delivered: delivered.len(),
            remaining: residual.len(),
        };
        if report.delivered > 0 {
            info!(
                delivered = report.delivered,
                remaining = report.remaining,
                "Drained queued writes"
            );
        }
        report
    }

    /// Snapshot of the queue, empty if the store cannot be read
    pub async fn pending(&self) -> Vec<QueuedAction> {
        let _guard = self.inner.store_lock.lock().await;
        self.load_or_empty().await
    }

    /// Snapshot of the queue, surfacing store failures
    pub async fn try_pending(&self) -> Result<Vec<QueuedAction>, QueueError> {
        let _guard = self.inner.store_lock.lock().await;
        Ok(self.inner.store.load().await?)
    }

    /// Discard every queued write
    pub async fn clear(&self) -> Result<(), QueueError> {
        let _guard = self.inner.store_lock.lock().await;
        self.inner.store.save(&[]).await?;
        Ok(())
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Resolve an endpoint: absolute URLs are used as given, anything else
    /// is joined onto the base URL.
    pub(crate) fn resolve(&self, endpoint: &str) -> Result<Url, QueueError> {
        match Url::parse(endpoint) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .inner
                    .base_url
                    .as_ref()
                    .ok_or_else(|| QueueError::Endpoint {
                        endpoint: endpoint.to_string(),
                        reason: "relative endpoint and no base URL configured".to_string(),
                    })?;
                base.join(endpoint).map_err(|e| QueueError::Endpoint {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(QueueError::Endpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// One POST; success means a 2xx status
    async fn post(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<reqwest::Response, QueueError> {
        let url = self.resolve(endpoint)?;
        let response = self.inner.http.post(url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueueError::Status(status));
        }
        Ok(response)
    }

    /// One POST, parsing the acknowledgment body. An empty body is
    /// acknowledged as JSON `null`.
    async fn post_for_body(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, QueueError> {
        let response = self.post(endpoint, payload).await?;
        let body = response.bytes().await?;
        parse_body(&body)
    }

    async fn enqueue(&self, action: QueuedAction) {
        if !self.inner.store.is_durable() {
            debug!(endpoint = %action.endpoint, "No durable store, dropping failed write");
            return;
        }

        let _guard = self.inner.store_lock.lock().await;
        let mut actions = self.load_or_empty().await;
        actions.push(action);
        if let Err(e) = self.inner.store.save(&actions).await {
            warn!(error = %e, "Failed to persist queued write");
        }
    }

    /// Caller must hold the store lock
    async fn load_or_empty(&self) -> Vec<QueuedAction> {
        match self.inner.store.load().await {
            Ok(actions) => actions,
            Err(e) => {
                warn!(error = %e, "Failed to read queue, treating it as empty");
                Vec::new()
            }
        }
    }
}

/// reqwest is built without a bundled TLS crypto provider; install the
/// workspace's ring provider before the first client is built.
fn install_crypto_provider() {
    // Err only means a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();
}

pub(crate) fn parse_body(body: &[u8]) -> Result<serde_json::Value, QueueError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_slice(body).map_err(QueueError::Decode)
}

/// Remove one matching entry from `current` for each delivered action,
/// keeping the order of what is left.
fn remove_delivered(current: Vec<QueuedAction>, delivered: &[&QueuedAction]) -> Vec<QueuedAction> {
    let mut consumed = vec![false; delivered.len()];
    current
        .into_iter()
        .filter(|action| {
            let hit = delivered
                .iter()
                .zip(consumed.iter_mut())
                .find(|(d, used)| !**used && **d == action);
            match hit {
                Some((_, used)) => {
                    *used = true;
                    false
                }
                None => true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn queue_with_base(base: Option<&str>) -> ActionQueue {
        let config = QueueConfig {
            base_url: base.map(str::to_string),
            ..Default::default()
        };
        ActionQueue::with_store(&config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let queue = queue_with_base(Some("http://helpdesk.local:8000/"));
        let url = queue.resolve("/api/tickets").unwrap();
        assert_eq!(url.as_str(), "http://helpdesk.local:8000/api/tickets");
    }

    #[test]
    fn test_resolve_absolute_ignores_base() {
        let queue = queue_with_base(Some("http://helpdesk.local:8000/"));
        let url = queue.resolve("https://other.example/api/tickets").unwrap();
        assert_eq!(url.host_str(), Some("other.example"));
    }

    #[test]
    fn test_resolve_relative_without_base_fails() {
        let queue = queue_with_base(None);
        let err = queue.resolve("/api/tickets").unwrap_err();
        assert!(matches!(err, QueueError::Endpoint { .. }));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = QueueConfig {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let result = ActionQueue::with_store(&config, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(QueueError::Endpoint { .. })));
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b"").unwrap(), serde_json::Value::Null);
        assert_eq!(parse_body(b" \n").unwrap(), serde_json::Value::Null);
        assert_eq!(parse_body(br#"{"id": 7}"#).unwrap(), json!({"id": 7}));
        assert!(matches!(parse_body(b"<html>"), Err(QueueError::Decode(_))));
    }

    #[test]
    fn test_remove_delivered_keeps_order_and_duplicates() {
        let a = QueuedAction::new("/a", json!(1));
        let b = QueuedAction::new("/b", json!(2));
        let c = QueuedAction::new("/c", json!(3));
        let late = QueuedAction::new("/late", json!(4));

        let current = vec![a.clone(), b.clone(), a.clone(), c.clone(), late.clone()];
        let residual = remove_delivered(current, &[&a, &c]);

        // Only one of the two identical entries is removed
        assert_eq!(residual, vec![b, a, late]);
    }
}
