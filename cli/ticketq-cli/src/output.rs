// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Output formatting for the queue CLI

use action_queue::QueuedAction;
use anyhow::Result;
use comfy_table::{Table, presets::NOTHING};
use serde::Serialize;

/// Longest payload preview shown in table output
const PAYLOAD_PREVIEW_CHARS: usize = 60;

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(headers);
    table
}

/// Print queued writes as a table, oldest first
pub fn print_actions(actions: &[QueuedAction]) {
    let mut table = create_table(&["#", "CREATED", "ENDPOINT", "PAYLOAD"]);
    for (position, action) in actions.iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            action.created_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            action.endpoint.clone(),
            preview(&action.payload),
        ]);
    }
    println!("{table}");
}

/// Compact single-line rendering of a payload, cut at a char boundary
fn preview(payload: &serde_json::Value) -> String {
    let compact = payload.to_string();
    if compact.chars().count() <= PAYLOAD_PREVIEW_CHARS {
        return compact;
    }
    let mut cut: String = compact.chars().take(PAYLOAD_PREVIEW_CHARS - 3).collect();
    cut.push_str("...");
    cut
}
