//! Now-serving board: the currently called ticket and its countdown.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::error;

use crate::db::{Database, DbError, TicketOverview};
use crate::events::{EventBus, Subscription, Topic};

/// Now-serving errors.
#[derive(Error, Debug)]
pub enum ServingError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Unreadable call timestamp: {0}")]
    BadTimestamp(String),
}

pub type ServingResult<T> = Result<T, ServingError>;

/// Countdown from a call timestamp to a fixed deadline.
///
/// The stored `called_at` is parsed as an absolute UTC instant; naive
/// parsing of zoneless strings is locale-dependent and caused display bugs
/// in the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    end_time: DateTime<Utc>,
}

impl Countdown {
    /// Build from an RFC 3339 call timestamp and the configured call
    /// duration.
    pub fn from_called_at(called_at: &str, duration: Duration) -> ServingResult<Self> {
        let called_at = DateTime::parse_from_rfc3339(called_at)
            .map_err(|_| ServingError::BadTimestamp(called_at.to_string()))?
            .with_timezone(&Utc);
        Ok(Self {
            end_time: called_at + duration,
        })
    }

    /// Remaining time at `now`, clamped at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.end_time - now).max(Duration::zero())
    }

    /// Whether the countdown has reached zero. Expiry is purely a display
    /// state; it does not advance or expire the underlying ticket.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == Duration::zero()
    }

    /// Remaining time rendered as `MM:SS`, pinned to `00:00` after expiry.
    pub fn display(&self, now: DateTime<Utc>) -> String {
        let secs = self.remaining(now).num_seconds();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

/// What the board shows for the currently called ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct ServingEntry {
    pub overview: TicketOverview,
    pub countdown: Countdown,
}

/// Fetch the most recently called ticket (optionally scoped to a
/// department) together with its countdown.
pub fn current_serving(
    db: &Database,
    department_id: Option<&str>,
    call_duration: Duration,
) -> ServingResult<Option<ServingEntry>> {
    let Some(overview) = db.current_called_ticket(department_id)? else {
        return Ok(None);
    };
    let called_at = overview
        .ticket
        .called_at
        .as_deref()
        .ok_or_else(|| ServingError::BadTimestamp("called ticket without called_at".into()))?;
    let countdown = Countdown::from_called_at(called_at, call_duration)?;
    Ok(Some(ServingEntry { overview, countdown }))
}

/// A live now-serving board.
///
/// Subscribes to the ticket change feed and re-fetches the current entry on
/// any insert, update, or delete (full refetch, deliberately not
/// incremental). Dropping the board drops the subscription, so a dismissed
/// display stops observing and holds no timer state.
pub struct NowServingBoard {
    db: Arc<Mutex<Database>>,
    department_id: Option<String>,
    call_duration: Duration,
    current: Arc<Mutex<Option<ServingEntry>>>,
    _subscription: Subscription,
}

impl NowServingBoard {
    /// Create a board and perform the initial fetch.
    pub fn new(
        db: Arc<Mutex<Database>>,
        bus: &EventBus,
        department_id: Option<String>,
        call_duration: Duration,
    ) -> Self {
        let current = Arc::new(Mutex::new(None));
        refresh_into(&db, department_id.as_deref(), call_duration, &current);

        let subscription = {
            let db = db.clone();
            let department_id = department_id.clone();
            let current = current.clone();
            bus.subscribe(Topic::Tickets, move |_| {
                refresh_into(&db, department_id.as_deref(), call_duration, &current);
            })
        };

        Self {
            db,
            department_id,
            call_duration,
            current,
            _subscription: subscription,
        }
    }

    /// The entry currently on display, if any.
    pub fn current(&self) -> Option<ServingEntry> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Force a refetch outside of a change notification.
    pub fn refresh(&self) {
        refresh_into(
            &self.db,
            self.department_id.as_deref(),
            self.call_duration,
            &self.current,
        );
    }
}

/// Refetch the current entry; on failure clear the display and log, matching
/// the original's fetch-error behavior.
fn refresh_into(
    db: &Arc<Mutex<Database>>,
    department_id: Option<&str>,
    call_duration: Duration,
    current: &Arc<Mutex<Option<ServingEntry>>>,
) {
    let fetched = {
        let db = db.lock().unwrap_or_else(|e| e.into_inner());
        current_serving(&db, department_id, call_duration)
    };
    let mut slot = current.lock().unwrap_or_else(|e| e.into_inner());
    match fetched {
        Ok(entry) => *slot = entry,
        Err(e) => {
            error!(error = %e, "now-serving refresh failed");
            *slot = None;
        }
    }
}
