// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Ticket API Trait Definition
//!
//! The subset of the helpdesk ticket API that the action queue writes to and
//! reads from. List responses wrap their items in a `tickets` field and
//! single-ticket responses in a `ticket` field; the queue's read helper
//! unwraps both.

use chrono::{DateTime, Utc};
use dropshot::{HttpError, HttpResponseCreated, HttpResponseOk, Path, RequestContext, TypedBody};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum TicketCategory {
    #[serde(rename = "Network Issues")]
    Network,
    #[serde(rename = "Software Problems")]
    Software,
    #[serde(rename = "Hardware Failures")]
    Hardware,
    #[serde(rename = "Security Incidents")]
    Security,
    #[serde(rename = "Account Access")]
    Access,
    #[serde(rename = "Email Issues")]
    Email,
    #[serde(rename = "Printer Problems")]
    Printer,
    #[serde(rename = "Application Errors")]
    Application,
    #[serde(rename = "System Performance")]
    Performance,
    #[serde(rename = "Mobile Device Support")]
    Mobile,
    #[serde(rename = "Database Issues")]
    Database,
    #[serde(rename = "Backup & Recovery")]
    Backup,
    #[default]
    #[serde(rename = "General Support")]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum TicketStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Pending,
    Resolved,
    Closed,
}

// ============================================================================
// Resources
// ============================================================================

/// A helpdesk ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ticket {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Body of a ticket creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TicketCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// `{"tickets": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TicketList {
    pub tickets: Vec<Ticket>,
}

/// `{"ticket": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TicketEnvelope {
    pub ticket: Ticket,
}

/// Path parameter for single-ticket endpoints
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TicketPath {
    pub ticket_id: u64,
}

// ============================================================================
// API Trait
// ============================================================================

#[dropshot::api_description]
pub trait TicketApi {
    /// Context type for request handlers
    type Context: Send + Sync + 'static;

    /// List tickets, oldest first
    #[endpoint {
        method = GET,
        path = "/api/tickets",
        tags = ["tickets"],
    }]
    async fn list_tickets(
        rqctx: RequestContext<Self::Context>,
    ) -> Result<HttpResponseOk<TicketList>, HttpError>;

    /// Get a single ticket
    #[endpoint {
        method = GET,
        path = "/api/tickets/{ticket_id}",
        tags = ["tickets"],
    }]
    async fn get_ticket(
        rqctx: RequestContext<Self::Context>,
        path: Path<TicketPath>,
    ) -> Result<HttpResponseOk<TicketEnvelope>, HttpError>;

    /// Create a ticket
    #[endpoint {
        method = POST,
        path = "/api/tickets",
        tags = ["tickets"],
    }]
    async fn create_ticket(
        rqctx: RequestContext<Self::Context>,
        body: TypedBody<NewTicket>,
    ) -> Result<HttpResponseCreated<TicketEnvelope>, HttpError>;
}
