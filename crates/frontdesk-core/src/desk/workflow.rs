//! Ticket status workflow.
//!
//! Transitions are validated against the state machine in
//! [`crate::models::TicketStatus`] before touching the database, then applied
//! together with the matching lifecycle timestamp. `called_at` is never
//! written here; the schema trigger stamps it with database time.

use thiserror::Error;
use tracing::info;

use crate::db::{Database, DbError};
use crate::models::{Ticket, TicketStatus};

/// Workflow errors.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("Cannot move a ticket from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Applies status transitions to tickets.
pub struct TicketWorkflow<'a> {
    db: &'a Database,
}

impl<'a> TicketWorkflow<'a> {
    /// Create a workflow over a database.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Move a ticket to `next`, stamping the matching lifecycle timestamp.
    ///
    /// `cancellation_reason` is recorded only when `next` is `cancelled`.
    /// Returns the ticket as stored after the transition.
    pub fn advance(
        &self,
        ticket_id: &str,
        next: TicketStatus,
        cancellation_reason: Option<&str>,
    ) -> WorkflowResult<Ticket> {
        let ticket = self
            .db
            .get_ticket(ticket_id)?
            .ok_or_else(|| WorkflowError::TicketNotFound(ticket_id.to_string()))?;

        if !ticket.status.can_transition_to(next) {
            return Err(WorkflowError::InvalidTransition {
                from: ticket.status.as_str(),
                to: next.as_str(),
            });
        }

        self.db.set_ticket_status(ticket_id, next, cancellation_reason)?;
        info!(
            queue_number = %ticket.queue_number,
            from = ticket.status.as_str(),
            to = next.as_str(),
            "ticket transition"
        );

        self.db
            .get_ticket(ticket_id)?
            .ok_or_else(|| WorkflowError::TicketNotFound(ticket_id.to_string()))
    }

    /// The transitions the UI may offer for a ticket. Empty once terminal,
    /// which disables the control entirely.
    pub fn available_transitions(&self, ticket_id: &str) -> WorkflowResult<&'static [TicketStatus]> {
        let ticket = self
            .db
            .get_ticket(ticket_id)?
            .ok_or_else(|| WorkflowError::TicketNotFound(ticket_id.to_string()))?;
        Ok(ticket.status.allowed_transitions())
    }
}
