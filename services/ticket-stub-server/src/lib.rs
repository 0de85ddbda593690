// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Stub ticket server
//!
//! A Dropshot server implementing the ticket API trait over an in-memory
//! ticket list. It can be switched into an outage, where every endpoint
//! answers 503, which makes it useful for:
//!
//! - End-to-end tests of the action queue's retry path
//! - Local development of the `ticketq` CLI

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use dropshot::{HttpError, HttpResponseCreated, HttpResponseOk, Path, RequestContext, TypedBody};
use ticket_api::{NewTicket, Ticket, TicketEnvelope, TicketList, TicketPath, TicketStatus};

// ============================================================================
// Server Context
// ============================================================================

/// State shared by the stub's handlers
#[derive(Debug)]
pub struct StubContext {
    tickets: Mutex<Vec<Ticket>>,
    available: AtomicBool,
}

impl Default for StubContext {
    fn default() -> Self {
        Self::new()
    }
}

impl StubContext {
    /// Create an empty, available server context
    pub fn new() -> Self {
        Self {
            tickets: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Switch the simulated outage off (`true`) or on (`false`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
        tracing::info!(available, "Stub availability changed");
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored ticket
    pub fn tickets(&self) -> Vec<Ticket> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Ticket>> {
        self.tickets.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Ticket store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn check_available(&self) -> Result<(), HttpError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(HttpError::for_unavail(
                None,
                "ticket service is unavailable".to_string(),
            ))
        }
    }

    fn create(&self, new: NewTicket) -> Ticket {
        let mut tickets = self.lock();
        let ticket = Ticket {
            id: tickets.len() as u64 + 1,
            title: new.title,
            description: new.description,
            category: new.category.unwrap_or_default(),
            priority: new.priority.unwrap_or_default(),
            status: TicketStatus::Open,
            created_at: Utc::now(),
        };
        tickets.push(ticket.clone());
        ticket
    }
}

// ============================================================================
// API Implementation
// ============================================================================

/// Marker type for the stub ticket API implementation
pub enum StubTicketApi {}

impl ticket_api::TicketApi for StubTicketApi {
    type Context = Arc<StubContext>;

    async fn list_tickets(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseOk<TicketList>, HttpError> {
        let ctx = rqctx.context();
        ctx.check_available()?;

        Ok(HttpResponseOk(TicketList {
            tickets: ctx.tickets(),
        }))
    }

    async fn get_ticket(
        rqctx: RequestContext<Self::Context>,
        path: Path<TicketPath>,
    ) -> Result<HttpResponseOk<TicketEnvelope>, HttpError> {
        let ctx = rqctx.context();
        ctx.check_available()?;
        let ticket_id = path.into_inner().ticket_id;

        let ticket = ctx
            .lock()
            .iter()
            .find(|t| t.id == ticket_id)
            .cloned()
            .ok_or_else(|| {
                HttpError::for_not_found(None, format!("Ticket {} not found", ticket_id))
            })?;

        Ok(HttpResponseOk(TicketEnvelope { ticket }))
    }

    async fn create_ticket(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<NewTicket>,
    ) -> Result<HttpResponseCreated<TicketEnvelope>, HttpError> {
        let ctx = rqctx.context();
        ctx.check_available()?;
        let new = body.into_inner();

        if new.title.trim().is_empty() {
            return Err(HttpError::for_bad_request(
                None,
                "title must not be empty".to_string(),
            ));
        }

        let ticket = ctx.create(new);
        tracing::info!(ticket_id = ticket.id, title = %ticket.title, "Created ticket");

        Ok(HttpResponseCreated(TicketEnvelope { ticket }))
    }
}

/// Create the Dropshot API description for the stub server
pub fn api_description() -> Result<dropshot::ApiDescription<Arc<StubContext>>, String> {
    ticket_api::ticket_api_mod::api_description::<StubTicketApi>().map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
