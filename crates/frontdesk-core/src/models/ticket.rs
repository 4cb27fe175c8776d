//! Queue ticket models and the status state machine.

use serde::{Deserialize, Serialize};

/// Ticket lifecycle status.
///
/// The workflow is forward-only: `pending → confirmed → checked_in → called
/// → completed`, with `cancelled` and `no_show` reachable as side exits.
/// Terminal statuses permit no further transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Submitted by the patient, awaiting front-desk confirmation
    Pending,
    /// Confirmed by staff
    Confirmed,
    /// Patient has arrived
    CheckedIn,
    /// Called to the department; drives the now-serving display
    Called,
    /// Visit finished
    Completed,
    /// Cancelled by patient or staff
    Cancelled,
    /// Patient never showed up
    NoShow,
}

impl TicketStatus {
    /// Canonical string literal stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Confirmed => "confirmed",
            TicketStatus::CheckedIn => "checked_in",
            TicketStatus::Called => "called",
            TicketStatus::Completed => "completed",
            TicketStatus::Cancelled => "cancelled",
            TicketStatus::NoShow => "no_show",
        }
    }

    /// Parse the stored literal.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TicketStatus::Pending),
            "confirmed" => Some(TicketStatus::Confirmed),
            "checked_in" => Some(TicketStatus::CheckedIn),
            "called" => Some(TicketStatus::Called),
            "completed" => Some(TicketStatus::Completed),
            "cancelled" => Some(TicketStatus::Cancelled),
            "no_show" => Some(TicketStatus::NoShow),
            _ => None,
        }
    }

    /// Statuses reachable from this one. Empty for terminal statuses.
    pub fn allowed_transitions(&self) -> &'static [TicketStatus] {
        match self {
            TicketStatus::Pending => &[TicketStatus::Confirmed, TicketStatus::Cancelled],
            TicketStatus::Confirmed => &[
                TicketStatus::CheckedIn,
                TicketStatus::Called,
                TicketStatus::Cancelled,
                TicketStatus::NoShow,
            ],
            TicketStatus::CheckedIn => &[
                TicketStatus::Called,
                TicketStatus::Completed,
                TicketStatus::Cancelled,
            ],
            TicketStatus::Called => &[TicketStatus::Completed, TicketStatus::Cancelled],
            TicketStatus::Completed | TicketStatus::Cancelled | TicketStatus::NoShow => &[],
        }
    }

    /// Whether `next` is a valid transition from this status.
    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Whether a ticket in this status counts toward department utilization.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            TicketStatus::Completed | TicketStatus::Cancelled | TicketStatus::NoShow
        )
    }
}

/// Visit priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Normal,
    High,
    Emergency,
}

impl TicketPriority {
    /// Canonical string literal stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Normal => "normal",
            TicketPriority::High => "high",
            TicketPriority::Emergency => "emergency",
        }
    }

    /// Parse the stored literal.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(TicketPriority::Normal),
            "high" => Some(TicketPriority::High),
            "emergency" => Some(TicketPriority::Emergency),
            _ => None,
        }
    }
}

/// A queue ticket for a visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// UUID
    pub id: String,
    /// Patient reference
    pub patient_id: String,
    /// Department reference
    pub department_id: String,
    /// Visit date (YYYY-MM-DD)
    pub assigned_date: String,
    /// Human-readable queue number, e.g. "P005"; unique per
    /// (department, assigned_date)
    pub queue_number: String,
    /// Current lifecycle status
    pub status: TicketStatus,
    /// Visit priority
    pub priority: TicketPriority,
    /// Reason for visit as entered by the patient
    pub reason: Option<String>,
    /// Stamped when staff confirm the ticket
    pub confirmed_at: Option<String>,
    /// Stamped when the patient checks in
    pub checked_in_at: Option<String>,
    /// Stamped by the database trigger when the ticket is called; never
    /// written by application code so it always reflects database time
    pub called_at: Option<String>,
    /// Stamped on completion
    pub completed_at: Option<String>,
    /// Stamped on cancellation
    pub cancelled_at: Option<String>,
    /// Free-text reason recorded on cancellation
    pub cancellation_reason: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Ticket {
    /// Create a new pending ticket.
    pub fn new(
        patient_id: String,
        department_id: String,
        assigned_date: String,
        queue_number: String,
        priority: TicketPriority,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            department_id,
            assigned_date,
            queue_number,
            status: TicketStatus::Pending,
            priority,
            reason: None,
            confirmed_at: None,
            checked_in_at: None,
            called_at: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Format a queue number from a department prefix and a 1-based sequence.
    pub fn format_queue_number(prefix: char, sequence: u32) -> String {
        format!("{}{:03}", prefix, sequence)
    }
}
