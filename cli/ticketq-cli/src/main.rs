// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! ticketq - submit helpdesk writes that survive outages

use std::path::PathBuf;

use action_queue::{ActionQueue, QueueConfig, QueueContext, SubmitOutcome};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

mod output;

#[derive(Parser)]
#[command(
    name = "ticketq",
    version,
    about = "Offline-tolerant helpdesk write queue",
    long_about = "Submit writes to the helpdesk API. Writes that fail are queued on disk and retried later."
)]
struct Cli {
    /// Base URL that relative endpoints are resolved against
    #[arg(short = 'U', long, global = true, env = "TICKETQ_BASE_URL")]
    base_url: Option<String>,

    /// Directory holding the queue file
    #[arg(short, long, global = true, env = "TICKETQ_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON configuration file, used instead of TICKETQ_* variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a write, queueing it if the remote is unreachable
    Submit {
        /// Endpoint path or absolute URL
        endpoint: String,
        /// JSON payload
        payload: String,
    },

    /// Retry every queued write once
    Drain,

    /// List queued writes
    #[command(alias = "ls")]
    List,

    /// Discard every queued write
    Clear,

    /// Read from the remote, printing a fallback value on failure
    Fetch {
        /// Endpoint path or absolute URL
        address: String,
        /// JSON value printed when the remote has nothing usable
        #[arg(short, long, default_value = "null")]
        fallback: String,
    },

    /// Keep draining in the foreground until interrupted
    Watch {
        /// Seconds between drain passes
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

impl Cli {
    async fn load_config(&self) -> Result<QueueConfig> {
        let mut config = match &self.config {
            Some(path) => QueueConfig::from_file(path).await?,
            None => QueueConfig::from_env()?,
        };

        if let Some(url) = &self.base_url {
            config.base_url = Some(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }

        // Short-lived commands drain inline; a detached pass would be cut
        // off when the process exits.
        config.drain_after_submit = false;

        tracing::debug!(
            base_url = ?config.base_url,
            data_dir = %config.data_dir.display(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ticketq=debug,action_queue=debug"
    } else {
        "ticketq=warn,action_queue=error"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.load_config().await?;

    match cli.command {
        Commands::Submit { endpoint, payload } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("Payload is not valid JSON")?;
            let queue = ActionQueue::new(&config)?;
            submit(&queue, &endpoint, payload, cli.json).await
        }
        Commands::Drain => {
            let queue = ActionQueue::new(&config)?;
            let report = queue.drain().await;
            if cli.json {
                output::print_json(&report)?;
            } else {
                println!(
                    "Delivered {} of {} queued writes, {} remaining",
                    report.delivered, report.attempted, report.remaining
                );
            }
            Ok(())
        }
        Commands::List => {
            let queue = ActionQueue::new(&config)?;
            let actions = queue
                .try_pending()
                .await
                .context("Failed to read the queue")?;
            if cli.json {
                output::print_json(&actions)?;
            } else if actions.is_empty() {
                println!("No queued writes");
            } else {
                output::print_actions(&actions);
            }
            Ok(())
        }
        Commands::Clear => {
            let queue = ActionQueue::new(&config)?;
            let count = queue.pending().await.len();
            queue.clear().await.context("Failed to clear the queue")?;
            if cli.json {
                output::print_json(&json!({ "cleared": count }))?;
            } else {
                println!("Cleared {} queued writes", count);
            }
            Ok(())
        }
        Commands::Fetch { address, fallback } => {
            let fallback: serde_json::Value =
                serde_json::from_str(&fallback).context("Fallback is not valid JSON")?;
            let queue = ActionQueue::new(&config)?;
            let fetched = queue.fetch_with_fallback(&address, fallback).await;
            if cli.json {
                output::print_json(&fetched)?;
            } else {
                if fetched.from_fallback {
                    eprintln!("Remote unavailable, showing fallback");
                }
                output::print_json(&fetched.data)?;
            }
            Ok(())
        }
        Commands::Watch { interval } => {
            let mut config = config;
            if let Some(secs) = interval {
                config.drain_interval_secs = secs;
            }
            watch(config).await
        }
    }
}

async fn submit(
    queue: &ActionQueue,
    endpoint: &str,
    payload: serde_json::Value,
    json: bool,
) -> Result<()> {
    let outcome = queue.submit(endpoint, payload).await;

    match &outcome {
        SubmitOutcome::Delivered(response) => {
            if json {
                output::print_json(&json!({ "status": "delivered", "response": response }))?;
            } else {
                println!("delivered");
                if !response.is_null() {
                    output::print_json(response)?;
                }
            }

            // The remote is reachable again, so try the backlog too
            let report = queue.drain().await;
            if report.delivered > 0 {
                eprintln!("Also delivered {} queued writes", report.delivered);
            }
        }
        SubmitOutcome::Queued => {
            if json {
                output::print_json(&json!({ "status": "queued" }))?;
            } else {
                println!("queued");
            }
        }
    }
    Ok(())
}

async fn watch(config: QueueConfig) -> Result<()> {
    let interval = config.drain_interval();
    let mut context = QueueContext::new(config)?;
    if !context.start() {
        anyhow::bail!("Queue store is not durable, nothing to drain");
    }

    eprintln!(
        "Draining every {}s, press Ctrl-C to stop",
        interval.as_secs()
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    context.shutdown().await;
    eprintln!("Stopped");
    Ok(())
}
