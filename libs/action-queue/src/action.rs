// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Queue record and operation outcome types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote write whose first attempt failed and which is waiting to be
/// redelivered.
///
/// Persisted as `{"endpoint", "payload", "createdAt"}` with `createdAt` in
/// RFC 3339 form. Records are never edited in place; a drain pass either
/// removes one or leaves it alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub endpoint: String,
    pub payload: serde_json::Value,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl QueuedAction {
    /// Create a record stamped with the current time
    pub fn new(endpoint: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}

/// Result of [`ActionQueue::submit`](crate::ActionQueue::submit)
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The remote acknowledged the write; carries the parsed response body
    Delivered(serde_json::Value),
    /// The attempt failed and the write was handed to the offline queue
    Queued,
}

impl SubmitOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SubmitOutcome::Delivered(_))
    }

    pub fn response(&self) -> Option<&serde_json::Value> {
        match self {
            SubmitOutcome::Delivered(body) => Some(body),
            SubmitOutcome::Queued => None,
        }
    }
}

/// Counts for one drain pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Entries for which a network attempt was made
    pub attempted: usize,
    /// Entries acknowledged and removed from the queue
    pub delivered: usize,
    /// Queue length after the pass was persisted
    pub remaining: usize,
}

/// Result of [`ActionQueue::fetch_with_fallback`](crate::ActionQueue::fetch_with_fallback)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    /// True when `data` is the caller's fallback rather than remote data
    #[serde(rename = "fromMock")]
    pub from_fallback: bool,
}

impl<T> Fetched<T> {
    pub(crate) fn remote(data: T) -> Self {
        Self {
            data,
            from_fallback: false,
        }
    }

    pub(crate) fn fallback(data: T) -> Self {
        Self {
            data,
            from_fallback: true,
        }
    }
}
