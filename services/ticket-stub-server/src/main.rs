// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Standalone stub ticket server for development
//!
//! Run with:
//! ```bash
//! cargo run -p ticket-stub-server
//! ```
//!
//! Then point the CLI at it:
//! ```bash
//! TICKETQ_BASE_URL=http://localhost:9091 ticketq submit /api/tickets '{"title": "VPN", "description": "Tunnel drops"}'
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dropshot::{ConfigDropshot, ConfigLogging, ConfigLoggingLevel, HttpServerStarter};

use ticket_stub_server::{StubContext, api_description};

/// Default bind address for the HTTP server.
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9091";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ticket_stub_server=info".to_string()),
        ))
        .init();

    let log = ConfigLogging::StderrTerminal {
        level: ConfigLoggingLevel::Info,
    }
    .to_logger("ticket-stub-server")
    .map_err(|error| anyhow::anyhow!("failed to create logger: {}", error))?;

    let bind_address: SocketAddr = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string())
        .parse()
        .context("Invalid BIND_ADDRESS")?;

    let config = ConfigDropshot {
        bind_address,
        default_request_body_max_bytes: 1024 * 1024,
        default_handler_task_mode: dropshot::HandlerTaskMode::Detached,
        ..Default::default()
    };

    let context = Arc::new(StubContext::new());
    let api = api_description().map_err(|e| anyhow::anyhow!(e))?;
    let server = HttpServerStarter::new(&config, api, context, &log)
        .map_err(|e| anyhow::anyhow!("Failed to create server: {}", e))?
        .start();

    tracing::info!("Stub ticket server listening on http://{}", bind_address);
    tracing::info!("Available endpoints:");
    tracing::info!("  GET  /api/tickets");
    tracing::info!("  GET  /api/tickets/{{ticket_id}}");
    tracing::info!("  POST /api/tickets");

    server
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
