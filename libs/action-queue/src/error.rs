// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for the action queue
//!
//! None of these escape the best-effort entry points (`submit`, `drain`,
//! `fetch_with_fallback`); they exist so failures can be logged with a
//! precise cause and so the `try_*` accessors can surface store problems.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the persisted queue store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The stored queue could not be parsed. The unreadable file has been
    /// moved aside to `quarantined` (when set) so its content is not lost.
    #[error("corrupt queue store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        quarantined: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single remote attempt or of the queue around it
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("cannot resolve endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}
