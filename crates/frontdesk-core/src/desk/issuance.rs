//! Visit-ticket issuance.
//!
//! Pipeline: validate request → find-or-create patient → number the ticket
//! within its (department, date) queue → insert.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{Department, Patient, Ticket, TicketPriority};

/// Issuance errors.
#[derive(Error, Debug)]
pub enum IssuanceError {
    #[error("Required field is missing: {0}")]
    MissingField(&'static str),

    #[error("Not a valid date: {0}")]
    InvalidDate(String),

    #[error("Visit date {requested} is before today ({today})")]
    DateInPast { requested: String, today: String },

    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    #[error("Department is not accepting visits: {0}")]
    DepartmentInactive(String),

    #[error("Could not allocate a queue number after {attempts} attempts")]
    QueueContention { attempts: u32 },

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type IssuanceResult<T> = Result<T, IssuanceError>;

/// A guest visit request as submitted from the registration form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitRequest {
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub medical_record_number: Option<String>,
    pub special_needs: bool,
    /// Chosen department (must be active)
    pub department_id: String,
    /// Preferred visit date, YYYY-MM-DD, today or later
    pub assigned_date: String,
    pub priority: TicketPriority,
    pub reason: Option<String>,
}

impl VisitRequest {
    /// A minimal request with only the required fields.
    pub fn new(full_name: String, department_id: String, assigned_date: String) -> Self {
        Self {
            full_name,
            date_of_birth: None,
            gender: None,
            phone: None,
            email: None,
            national_id: None,
            medical_record_number: None,
            special_needs: false,
            department_id,
            assigned_date,
            priority: TicketPriority::Normal,
            reason: None,
        }
    }
}

/// The outcome of a successful submission: what the guest page displays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedTicket {
    pub ticket: Ticket,
    pub patient: Patient,
    pub department: Department,
    /// Whether this submission created a new patient row (false when an
    /// existing patient was matched and updated)
    pub patient_created: bool,
}

/// Issues queue tickets against a database.
pub struct TicketIssuer<'a> {
    db: &'a Database,
    retries: u32,
}

impl<'a> TicketIssuer<'a> {
    /// Create an issuer with the default retry budget.
    pub fn new(db: &'a Database) -> Self {
        Self { db, retries: 3 }
    }

    /// Override the queue-number retry budget.
    pub fn with_retries(db: &'a Database, retries: u32) -> Self {
        Self { db, retries }
    }

    /// Issue a ticket for a visit request.
    ///
    /// `today` is the issuance-side clock date; requests for earlier dates
    /// are rejected here rather than trusting form-side validation alone.
    /// Patient creation is not rolled back if the ticket insert fails.
    pub fn issue(&self, request: &VisitRequest, today: NaiveDate) -> IssuanceResult<IssuedTicket> {
        let department = self.validate(request, today)?;
        let (patient, patient_created) = self.find_or_create_patient(request)?;
        let ticket = self.insert_numbered_ticket(request, &patient, &department)?;

        info!(
            queue_number = %ticket.queue_number,
            department = %department.name,
            date = %ticket.assigned_date,
            "ticket issued"
        );

        Ok(IssuedTicket {
            ticket,
            patient,
            department,
            patient_created,
        })
    }

    fn validate(&self, request: &VisitRequest, today: NaiveDate) -> IssuanceResult<Department> {
        if request.full_name.trim().is_empty() {
            return Err(IssuanceError::MissingField("full_name"));
        }
        if request.department_id.trim().is_empty() {
            return Err(IssuanceError::MissingField("department_id"));
        }

        let requested = NaiveDate::parse_from_str(&request.assigned_date, "%Y-%m-%d")
            .map_err(|_| IssuanceError::InvalidDate(request.assigned_date.clone()))?;
        if requested < today {
            return Err(IssuanceError::DateInPast {
                requested: request.assigned_date.clone(),
                today: today.to_string(),
            });
        }

        let department = self
            .db
            .get_department(&request.department_id)?
            .ok_or_else(|| IssuanceError::UnknownDepartment(request.department_id.clone()))?;
        if !department.active {
            return Err(IssuanceError::DepartmentInactive(department.name.clone()));
        }
        Ok(department)
    }

    /// Match an existing patient on national ID or MRN and update their
    /// demographics in place, or create a new patient row.
    fn find_or_create_patient(&self, request: &VisitRequest) -> IssuanceResult<(Patient, bool)> {
        let existing = self.db.find_patient_by_identity(
            request.national_id.as_deref(),
            request.medical_record_number.as_deref(),
        )?;

        match existing {
            Some(mut patient) => {
                patient.full_name = request.full_name.trim().to_string();
                patient.date_of_birth = request.date_of_birth.clone();
                patient.gender = request.gender.clone();
                patient.phone = request.phone.clone();
                patient.email = request.email.clone();
                if request.national_id.is_some() {
                    patient.national_id = request.national_id.clone();
                }
                if request.medical_record_number.is_some() {
                    patient.medical_record_number = request.medical_record_number.clone();
                }
                patient.special_needs = request.special_needs;
                patient.touch();
                self.db.update_patient(&patient)?;
                Ok((patient, false))
            }
            None => {
                let mut patient = Patient::new(request.full_name.trim().to_string());
                patient.date_of_birth = request.date_of_birth.clone();
                patient.gender = request.gender.clone();
                patient.phone = request.phone.clone();
                patient.email = request.email.clone();
                patient.national_id = request.national_id.clone();
                patient.medical_record_number = request.medical_record_number.clone();
                patient.special_needs = request.special_needs;
                self.db.insert_patient(&patient)?;
                Ok((patient, true))
            }
        }
    }

    /// Count, number, insert; re-count and retry on a queue-number
    /// collision. The unique constraint on
    /// (department, assigned_date, queue_number) closes the
    /// count-then-insert race of the original design.
    fn insert_numbered_ticket(
        &self,
        request: &VisitRequest,
        patient: &Patient,
        department: &Department,
    ) -> IssuanceResult<Ticket> {
        let attempts = self.retries.max(1);
        for attempt in 0..attempts {
            let count = self
                .db
                .count_tickets_for(&department.id, &request.assigned_date)?;
            // The attempt offset steps past numbers that sit above the count
            // (a collision where the count itself has not moved)
            let queue_number =
                Ticket::format_queue_number(department.queue_prefix(), count + 1 + attempt);

            let mut ticket = Ticket::new(
                patient.id.clone(),
                department.id.clone(),
                request.assigned_date.clone(),
                queue_number,
                request.priority,
            );
            ticket.reason = request.reason.clone();

            match self.db.insert_ticket(&ticket) {
                Ok(()) => return Ok(ticket),
                Err(e) if e.is_unique_violation() => {
                    warn!(
                        queue_number = %ticket.queue_number,
                        attempt = attempt + 1,
                        "queue number collision, renumbering"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(IssuanceError::QueueContention { attempts })
    }
}
