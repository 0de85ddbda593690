// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Queue configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default period between background drain passes (seconds)
pub const DEFAULT_DRAIN_INTERVAL_SECS: u64 = 30;

/// Queue configuration loaded from defaults, environment variables or a
/// JSON file
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Base URL that relative endpoints are resolved against
    pub base_url: Option<String>,

    /// Directory holding the persisted queue file
    pub data_dir: PathBuf,

    /// Period between background drain passes
    pub drain_interval_secs: u64,

    /// Per-request timeout. `None` leaves requests bounded only by the
    /// network stack.
    pub http_timeout_secs: Option<u64>,

    /// Start a drain pass after every delivered submit
    pub drain_after_submit: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            data_dir: default_data_dir(),
            drain_interval_secs: DEFAULT_DRAIN_INTERVAL_SECS,
            http_timeout_secs: None,
            drain_after_submit: true,
        }
    }
}

/// Platform data directory for the queue, e.g. `~/.local/share/ticketq`
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ticketq")
}

impl QueueConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults; set but unparsable numbers are
    /// errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("TICKETQ_BASE_URL") {
            config.base_url = Some(url);
        }

        if let Ok(dir) = std::env::var("TICKETQ_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(secs) = std::env::var("TICKETQ_DRAIN_INTERVAL_SECS") {
            config.drain_interval_secs = secs
                .parse()
                .context("Invalid TICKETQ_DRAIN_INTERVAL_SECS")?;
        }

        if let Ok(secs) = std::env::var("TICKETQ_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs =
                Some(secs.parse().context("Invalid TICKETQ_HTTP_TIMEOUT_SECS")?);
        }

        Ok(config)
    }

    /// Load configuration from a JSON file; missing fields take defaults
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn drain_interval(&self) -> Duration {
        // A zero period would make tokio::time::interval panic
        Duration::from_secs(self.drain_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.drain_interval(), Duration::from_secs(30));
        assert!(config.http_timeout().is_none());
        assert!(config.base_url.is_none());
        assert!(config.drain_after_submit);
        assert!(config.data_dir.ends_with("ticketq"));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = QueueConfig {
            drain_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.drain_interval(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_from_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketq.json");
        std::fs::write(
            &path,
            r#"{"base_url": "http://helpdesk.local:8000", "drain_interval_secs": 5}"#,
        )
        .unwrap();

        let config = QueueConfig::from_file(&path).await.unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://helpdesk.local:8000"));
        assert_eq!(config.drain_interval_secs, 5);
        assert!(config.http_timeout_secs.is_none());
    }

    #[tokio::test]
    async fn test_from_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticketq.json");
        std::fs::write(&path, "drain_interval_secs = 5").unwrap();

        let err = QueueConfig::from_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
