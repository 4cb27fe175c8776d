//! Front-Desk Core Library
//!
//! Hospital front-desk system: guest self-registration issues queue tickets,
//! staff drive tickets through a fixed status workflow, and a now-serving
//! board shows the currently called ticket per department with a countdown.
//!
//! # Architecture
//!
//! ```text
//! Guest registration form ──► Ticket Issuance ──┐
//!                                               │
//! Staff queue view ─────────► Status Workflow ──┤
//!                                               ▼
//!                                        SQLite database
//!                                               │
//!                                     change feed (EventBus)
//!                                               │
//!                              ┌────────────────┴──────────────┐
//!                              ▼                               ▼
//!                     Now-Serving Board                  Dashboard
//!                    (countdown, refetch)           (loads, summaries)
//! ```
//!
//! # Core principle
//!
//! The database is the single source of truth. Queue numbers are guarded by
//! a uniqueness constraint, and `called_at` is stamped by a database trigger
//! so the countdown never depends on a client clock.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Department, Staff, Ticket)
//! - [`desk`]: Issuance, workflow, now-serving, dashboard services
//! - [`auth`]: Accounts, sessions, admin-area access
//! - [`events`]: In-process change feed
//! - [`config`]: Tunable parameters

pub mod auth;
pub mod config;
pub mod db;
pub mod desk;
pub mod events;
pub mod models;

// Re-export commonly used types
pub use config::DeskConfig;
pub use db::{Database, TicketOverview};
pub use desk::{
    Countdown, DashboardSummary, DepartmentLoad, IssuedTicket, NowServingBoard, ServingEntry,
    TicketIssuer, TicketWorkflow, VisitRequest,
};
pub use events::{ChangeEvent, ChangeKind, EventBus, Subscription, Topic};
pub use models::{
    Department, Patient, Staff, StaffRole, Ticket, TicketPriority, TicketStatus,
};

use std::path::Path;
use std::sync::{Arc, Mutex};

use auth::{AuthError, Session};
use db::DbError;
use desk::{IssuanceError, ServingError, WorkflowError};

// =========================================================================
// Crate Error Type
// =========================================================================

/// Top-level error for the [`FrontDesk`] facade.
#[derive(Debug, thiserror::Error)]
pub enum FrontDeskError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Serving(#[from] ServingError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for FrontDeskError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        FrontDeskError::LockPoisoned(e.to_string())
    }
}

pub type FrontDeskResult<T> = Result<T, FrontDeskError>;

// =========================================================================
// Main Facade Object
// =========================================================================

/// Application-lifetime front-desk context: the database, the change feed,
/// the configuration, and the signed-in session.
///
/// Construct one per application, share it by cloning the inner handles via
/// the accessors, and drop it to tear everything down.
pub struct FrontDesk {
    db: Arc<Mutex<Database>>,
    bus: EventBus,
    config: DeskConfig,
    session: Mutex<Option<Session>>,
}

impl FrontDesk {
    /// Open or create a front-desk database at the given path.
    pub fn open<P: AsRef<Path>>(path: P, config: DeskConfig) -> FrontDeskResult<Self> {
        Ok(Self::from_database(Database::open(path)?, config))
    }

    /// Create an in-memory front desk (for testing).
    pub fn open_in_memory(config: DeskConfig) -> FrontDeskResult<Self> {
        Ok(Self::from_database(Database::open_in_memory()?, config))
    }

    fn from_database(db: Database, config: DeskConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            bus: EventBus::new(),
            config,
            session: Mutex::new(None),
        }
    }

    /// The change feed, for wiring up observers.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// The active configuration.
    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    fn publish(&self, topic: Topic, kind: ChangeKind, record_id: Option<String>) {
        self.bus.publish(&ChangeEvent {
            topic,
            kind,
            record_id,
        });
    }

    // =========================================================================
    // Department Operations
    // =========================================================================

    /// Create a department.
    pub fn create_department(&self, department: &Department) -> FrontDeskResult<()> {
        {
            let db = self.db.lock()?;
            db.insert_department(department)?;
        }
        self.publish(
            Topic::Departments,
            ChangeKind::Insert,
            Some(department.id.clone()),
        );
        Ok(())
    }

    /// Update a department.
    pub fn update_department(&self, department: &Department) -> FrontDeskResult<bool> {
        let updated = {
            let db = self.db.lock()?;
            db.update_department(department)?
        };
        if updated {
            self.publish(
                Topic::Departments,
                ChangeKind::Update,
                Some(department.id.clone()),
            );
        }
        Ok(updated)
    }

    /// All departments.
    pub fn departments(&self) -> FrontDeskResult<Vec<Department>> {
        let db = self.db.lock()?;
        Ok(db.list_departments()?)
    }

    /// Departments offered on the registration form.
    pub fn active_departments(&self) -> FrontDeskResult<Vec<Department>> {
        let db = self.db.lock()?;
        Ok(db.list_active_departments()?)
    }

    // =========================================================================
    // Staff Operations
    // =========================================================================

    /// Create a staff member.
    pub fn create_staff(&self, staff: &Staff) -> FrontDeskResult<()> {
        {
            let db = self.db.lock()?;
            db.insert_staff(staff)?;
        }
        self.publish(Topic::Staff, ChangeKind::Insert, Some(staff.id.clone()));
        Ok(())
    }

    /// Update a staff member.
    pub fn update_staff(&self, staff: &Staff) -> FrontDeskResult<bool> {
        let updated = {
            let db = self.db.lock()?;
            db.update_staff(staff)?
        };
        if updated {
            self.publish(Topic::Staff, ChangeKind::Update, Some(staff.id.clone()));
        }
        Ok(updated)
    }

    /// All staff members.
    pub fn staff(&self) -> FrontDeskResult<Vec<Staff>> {
        let db = self.db.lock()?;
        Ok(db.list_staff()?)
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// All patients.
    pub fn patients(&self) -> FrontDeskResult<Vec<Patient>> {
        let db = self.db.lock()?;
        Ok(db.list_patients()?)
    }

    /// Search patients by name prefix.
    pub fn search_patients(&self, query: &str, limit: usize) -> FrontDeskResult<Vec<Patient>> {
        let db = self.db.lock()?;
        Ok(db.search_patients(query, limit)?)
    }

    // =========================================================================
    // Ticket Operations
    // =========================================================================

    /// Submit a guest visit request, issuing a queue ticket dated today or
    /// later.
    pub fn submit_visit(&self, request: &VisitRequest) -> FrontDeskResult<IssuedTicket> {
        let issued = {
            let db = self.db.lock()?;
            let issuer = TicketIssuer::with_retries(&db, self.config.issuance_retries);
            issuer.issue(request, chrono::Utc::now().date_naive())?
        };
        if issued.patient_created {
            self.publish(
                Topic::Patients,
                ChangeKind::Insert,
                Some(issued.patient.id.clone()),
            );
        } else {
            self.publish(
                Topic::Patients,
                ChangeKind::Update,
                Some(issued.patient.id.clone()),
            );
        }
        self.publish(
            Topic::Tickets,
            ChangeKind::Insert,
            Some(issued.ticket.id.clone()),
        );
        Ok(issued)
    }

    /// Tickets for a date, optionally narrowed by a free-text filter.
    pub fn tickets_for_date(
        &self,
        date: &str,
        filter: Option<&str>,
    ) -> FrontDeskResult<Vec<TicketOverview>> {
        let db = self.db.lock()?;
        Ok(db.list_tickets_for_date(date, filter)?)
    }

    /// Move a ticket through the status workflow.
    pub fn advance_ticket(
        &self,
        ticket_id: &str,
        next: TicketStatus,
        cancellation_reason: Option<&str>,
    ) -> FrontDeskResult<Ticket> {
        let ticket = {
            let db = self.db.lock()?;
            TicketWorkflow::new(&db).advance(ticket_id, next, cancellation_reason)?
        };
        self.publish(Topic::Tickets, ChangeKind::Update, Some(ticket.id.clone()));
        Ok(ticket)
    }

    /// The transitions the queue view may offer for a ticket.
    pub fn available_transitions(
        &self,
        ticket_id: &str,
    ) -> FrontDeskResult<&'static [TicketStatus]> {
        let db = self.db.lock()?;
        Ok(TicketWorkflow::new(&db).available_transitions(ticket_id)?)
    }

    // =========================================================================
    // Now-Serving Operations
    // =========================================================================

    /// One-shot fetch of the currently called ticket.
    pub fn now_serving(&self, department_id: Option<&str>) -> FrontDeskResult<Option<ServingEntry>> {
        let db = self.db.lock()?;
        Ok(desk::current_serving(
            &db,
            department_id,
            self.config.call_duration(),
        )?)
    }

    /// A live board that follows the ticket change feed until dropped.
    pub fn now_serving_board(&self, department_id: Option<String>) -> NowServingBoard {
        NowServingBoard::new(
            self.db.clone(),
            &self.bus,
            department_id,
            self.config.call_duration(),
        )
    }

    // =========================================================================
    // Dashboard Operations
    // =========================================================================

    /// Per-status counts for a date.
    pub fn dashboard_summary(&self, date: &str) -> FrontDeskResult<DashboardSummary> {
        let db = self.db.lock()?;
        Ok(desk::dashboard_summary(&db, date)?)
    }

    /// Department utilization, busiest first.
    pub fn department_loads(&self) -> FrontDeskResult<Vec<DepartmentLoad>> {
        let db = self.db.lock()?;
        Ok(desk::department_loads(&db)?)
    }

    // =========================================================================
    // Auth Operations
    // =========================================================================

    /// Register a new account.
    pub fn sign_up(&self, email: &str, password: &str) -> FrontDeskResult<()> {
        {
            let db = self.db.lock()?;
            auth::sign_up(&db, email, password)?;
        }
        self.publish(Topic::Auth, ChangeKind::Insert, None);
        Ok(())
    }

    /// Sign in, retaining the session until sign-out or teardown.
    pub fn sign_in(&self, email: &str, password: &str) -> FrontDeskResult<Session> {
        let session = {
            let db = self.db.lock()?;
            auth::sign_in(&db, email, password)?
        };
        *self.session.lock()? = Some(session.clone());
        self.publish(Topic::Auth, ChangeKind::Update, Some(session.account_id.clone()));
        Ok(session)
    }

    /// Drop the current session, if any.
    pub fn sign_out(&self) -> FrontDeskResult<()> {
        let had_session = self.session.lock()?.take().is_some();
        if had_session {
            self.publish(Topic::Auth, ChangeKind::Delete, None);
        }
        Ok(())
    }

    /// The current session, if signed in.
    pub fn current_session(&self) -> FrontDeskResult<Option<Session>> {
        Ok(self.session.lock()?.clone())
    }

    /// Whether the signed-in user may open an admin section. Not signed in,
    /// or signed in without a staff profile, means no.
    pub fn can_access(&self, section: auth::AdminSection) -> FrontDeskResult<bool> {
        let session = self.session.lock()?;
        Ok(session
            .as_ref()
            .and_then(|s| s.staff())
            .map(|staff| staff.active && auth::allowed(staff.role, section))
            .unwrap_or(false))
    }
}
