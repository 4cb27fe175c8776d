//! Ticket database operations.

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{Database, DbError, DbResult};
use crate::models::{Ticket, TicketPriority, TicketStatus};

const TICKET_COLUMNS: &str = "id, patient_id, department_id, assigned_date, queue_number, \
     status, priority, reason, confirmed_at, checked_in_at, called_at, completed_at, \
     cancelled_at, cancellation_reason, created_at, updated_at";

fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<TicketRow> {
    Ok(TicketRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        department_id: row.get(2)?,
        assigned_date: row.get(3)?,
        queue_number: row.get(4)?,
        status: row.get(5)?,
        priority: row.get(6)?,
        reason: row.get(7)?,
        confirmed_at: row.get(8)?,
        checked_in_at: row.get(9)?,
        called_at: row.get(10)?,
        completed_at: row.get(11)?,
        cancelled_at: row.get(12)?,
        cancellation_reason: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

/// A ticket joined to patient and department display fields, as shown in the
/// staff queue view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketOverview {
    pub ticket: Ticket,
    pub patient_name: String,
    pub patient_phone: Option<String>,
    pub department_name: String,
}

impl Database {
    /// Insert a new ticket.
    pub fn insert_ticket(&self, ticket: &Ticket) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO tickets (
                id, patient_id, department_id, assigned_date, queue_number,
                status, priority, reason, confirmed_at, checked_in_at,
                called_at, completed_at, cancelled_at, cancellation_reason,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                ticket.id,
                ticket.patient_id,
                ticket.department_id,
                ticket.assigned_date,
                ticket.queue_number,
                ticket.status.as_str(),
                ticket.priority.as_str(),
                ticket.reason,
                ticket.confirmed_at,
                ticket.checked_in_at,
                ticket.called_at,
                ticket.completed_at,
                ticket.cancelled_at,
                ticket.cancellation_reason,
                ticket.created_at,
                ticket.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a ticket by ID.
    pub fn get_ticket(&self, id: &str) -> DbResult<Option<Ticket>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS),
                [id],
                ticket_from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Count tickets for a department on a date (all statuses).
    ///
    /// Drives queue-number sequencing; cancelled tickets keep their number,
    /// so the count never goes backwards within a day.
    pub fn count_tickets_for(&self, department_id: &str, assigned_date: &str) -> DbResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE department_id = ? AND assigned_date = ?",
            [department_id, assigned_date],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Apply a status transition to a ticket row.
    ///
    /// Stamps the lifecycle timestamp matching the target status. `called`
    /// deliberately stamps nothing here; the schema trigger writes
    /// `called_at` with database time. Validity of the transition is the
    /// caller's concern (see `desk::workflow`).
    pub fn set_ticket_status(
        &self,
        id: &str,
        next: TicketStatus,
        cancellation_reason: Option<&str>,
    ) -> DbResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let rows_affected = match next {
            TicketStatus::Confirmed => self.conn.execute(
                "UPDATE tickets SET status = ?2, confirmed_at = ?3, updated_at = ?3 WHERE id = ?1",
                params![id, next.as_str(), now],
            )?,
            TicketStatus::CheckedIn => self.conn.execute(
                "UPDATE tickets SET status = ?2, checked_in_at = ?3, updated_at = ?3 WHERE id = ?1",
                params![id, next.as_str(), now],
            )?,
            TicketStatus::Completed => self.conn.execute(
                "UPDATE tickets SET status = ?2, completed_at = ?3, updated_at = ?3 WHERE id = ?1",
                params![id, next.as_str(), now],
            )?,
            TicketStatus::Cancelled => self.conn.execute(
                "UPDATE tickets SET status = ?2, cancelled_at = ?3, cancellation_reason = ?4, \
                 updated_at = ?3 WHERE id = ?1",
                params![id, next.as_str(), now, cancellation_reason],
            )?,
            TicketStatus::Called | TicketStatus::NoShow | TicketStatus::Pending => {
                self.conn.execute(
                    "UPDATE tickets SET status = ?2, updated_at = ?3 WHERE id = ?1",
                    params![id, next.as_str(), now],
                )?
            }
        };
        Ok(rows_affected > 0)
    }

    /// List tickets for a date, optionally narrowed by a free-text filter
    /// matching queue number, patient name, phone, or national ID.
    pub fn list_tickets_for_date(
        &self,
        assigned_date: &str,
        filter: Option<&str>,
    ) -> DbResult<Vec<TicketOverview>> {
        let pattern = filter.map(|f| format!("%{}%", f.trim()));
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {columns}, p.full_name, p.phone, d.name
            FROM tickets t
            JOIN patients p ON p.id = t.patient_id
            JOIN departments d ON d.id = t.department_id
            WHERE t.assigned_date = ?1
              AND (?2 IS NULL
                   OR t.queue_number LIKE ?2
                   OR p.full_name LIKE ?2
                   OR p.phone LIKE ?2
                   OR p.national_id LIKE ?2)
            ORDER BY d.name, CAST(substr(t.queue_number, 2) AS INTEGER)
            "#,
            columns = prefixed_ticket_columns("t")
        ))?;

        let rows = stmt.query_map(params![assigned_date, pattern], |row| {
            let ticket = ticket_from_row(row)?;
            Ok((ticket, row.get::<_, String>(16)?, row.get::<_, Option<String>>(17)?, row.get::<_, String>(18)?))
        })?;

        let mut overviews = Vec::new();
        for row in rows {
            let (ticket_row, patient_name, patient_phone, department_name) = row?;
            overviews.push(TicketOverview {
                ticket: ticket_row.try_into()?,
                patient_name,
                patient_phone,
                department_name,
            });
        }
        Ok(overviews)
    }

    /// The most recently called, not-yet-finalized ticket, optionally scoped
    /// to a department. This is what the now-serving board shows.
    pub fn current_called_ticket(
        &self,
        department_id: Option<&str>,
    ) -> DbResult<Option<TicketOverview>> {
        let result = self
            .conn
            .query_row(
                &format!(
                    r#"
                    SELECT {columns}, p.full_name, p.phone, d.name
                    FROM tickets t
                    JOIN patients p ON p.id = t.patient_id
                    JOIN departments d ON d.id = t.department_id
                    WHERE t.status = 'called'
                      AND (?1 IS NULL OR t.department_id = ?1)
                    ORDER BY t.called_at DESC
                    LIMIT 1
                    "#,
                    columns = prefixed_ticket_columns("t")
                ),
                params![department_id],
                |row| {
                    let ticket = ticket_from_row(row)?;
                    Ok((
                        ticket,
                        row.get::<_, String>(16)?,
                        row.get::<_, Option<String>>(17)?,
                        row.get::<_, String>(18)?,
                    ))
                },
            )
            .optional()?;

        result
            .map(|(ticket_row, patient_name, patient_phone, department_name)| {
                Ok(TicketOverview {
                    ticket: ticket_row.try_into()?,
                    patient_name,
                    patient_phone,
                    department_name,
                })
            })
            .transpose()
    }

    /// Count tickets on a date, by status.
    pub fn count_tickets_by_status_on(
        &self,
        assigned_date: &str,
    ) -> DbResult<Vec<(TicketStatus, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM tickets WHERE assigned_date = ? GROUP BY status",
        )?;
        let rows = stmt.query_map([assigned_date], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (status, count) = row?;
            let status = TicketStatus::parse(&status)
                .ok_or_else(|| DbError::Constraint(format!("Unknown ticket status: {}", status)))?;
            counts.push((status, count));
        }
        Ok(counts)
    }

    /// Active (non-terminal) ticket count per department id.
    pub fn active_ticket_counts(&self) -> DbResult<Vec<(String, u32)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT department_id, COUNT(*)
            FROM tickets
            WHERE status NOT IN ('completed', 'cancelled', 'no_show')
            GROUP BY department_id
            "#,
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// Column list with a table alias prefix, for joined queries.
fn prefixed_ticket_columns(alias: &str) -> String {
    TICKET_COLUMNS
        .split(", ")
        .map(|col| format!("{}.{}", alias, col))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Intermediate row struct for database mapping.
struct TicketRow {
    id: String,
    patient_id: String,
    department_id: String,
    assigned_date: String,
    queue_number: String,
    status: String,
    priority: String,
    reason: Option<String>,
    confirmed_at: Option<String>,
    checked_in_at: Option<String>,
    called_at: Option<String>,
    completed_at: Option<String>,
    cancelled_at: Option<String>,
    cancellation_reason: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DbError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = TicketStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown ticket status: {}", row.status)))?;
        let priority = TicketPriority::parse(&row.priority).ok_or_else(|| {
            DbError::Constraint(format!("Unknown ticket priority: {}", row.priority))
        })?;

        Ok(Ticket {
            id: row.id,
            patient_id: row.patient_id,
            department_id: row.department_id,
            assigned_date: row.assigned_date,
            queue_number: row.queue_number,
            status,
            priority,
            reason: row.reason,
            confirmed_at: row.confirmed_at,
            checked_in_at: row.checked_in_at,
            called_at: row.called_at,
            completed_at: row.completed_at,
            cancelled_at: row.cancelled_at,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
