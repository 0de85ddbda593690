// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Read helper that degrades to a caller-supplied fallback

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::action::Fetched;
use crate::error::QueueError;
use crate::queue::{ActionQueue, parse_body};

impl ActionQueue {
    /// GET `address` and return its primary payload, or `fallback` if the
    /// read fails in any way or yields nothing usable
    ///
    /// The primary payload is the body itself when it is an array, else its
    /// `tickets` field, else its `ticket` field, else the whole body. A
    /// `null` or empty-array payload counts as no data.
    pub async fn fetch_with_fallback<T>(&self, address: &str, fallback: T) -> Fetched<T>
    where
        T: DeserializeOwned,
    {
        let payload = match self.fetch_primary(address).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(address = %address, "Read returned no data, using fallback");
                return Fetched::fallback(fallback);
            }
            Err(e) => {
                debug!(address = %address, error = %e, "Read failed, using fallback");
                return Fetched::fallback(fallback);
            }
        };

        match serde_json::from_value(payload) {
            Ok(data) => Fetched::remote(data),
            Err(e) => {
                debug!(address = %address, error = %e, "Unexpected payload shape, using fallback");
                Fetched::fallback(fallback)
            }
        }
    }

    async fn fetch_primary(&self, address: &str) -> Result<Option<Value>, QueueError> {
        let url = self.resolve(address)?;
        let response = self.http().get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueueError::Status(status));
        }

        let body = parse_body(&response.bytes().await?)?;
        let payload = primary_payload(body);
        Ok((!is_empty_payload(&payload)).then_some(payload))
    }
}

/// Pick the primary payload out of a response body
pub fn primary_payload(body: Value) -> Value {
    match body {
        Value::Object(mut fields) => {
            for key in ["tickets", "ticket"] {
                if fields.get(key).is_some_and(is_truthy)
                    && let Some(value) = fields.remove(key)
                {
                    return value;
                }
            }
            Value::Object(fields)
        }
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
