//! Dashboard aggregates.

use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::models::{Department, TicketStatus};

/// Per-status ticket counts for one date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    /// The date the counts cover (YYYY-MM-DD)
    pub date: String,
    /// All tickets on the date
    pub total: u32,
    /// Tickets not yet in a terminal status
    pub active: u32,
    /// Counts per status, only statuses that occur
    pub by_status: Vec<(TicketStatus, u32)>,
}

/// Utilization of one department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepartmentLoad {
    pub department: Department,
    /// Tickets not in a terminal status
    pub active_tickets: u32,
    /// `active / capacity` as a whole percentage; capacity 0 counts as 1 so
    /// the figure is always defined (display convention, not an admission
    /// limit)
    pub utilization_percent: u32,
}

impl DepartmentLoad {
    fn new(department: Department, active_tickets: u32) -> Self {
        let capacity = department.max_capacity.max(1);
        Self {
            department,
            active_tickets,
            utilization_percent: active_tickets * 100 / capacity,
        }
    }
}

/// Status counts for one date.
pub fn dashboard_summary(db: &Database, date: &str) -> DbResult<DashboardSummary> {
    let by_status = db.count_tickets_by_status_on(date)?;
    let total = by_status.iter().map(|(_, n)| n).sum();
    let active = by_status
        .iter()
        .filter(|(status, _)| status.is_active())
        .map(|(_, n)| n)
        .sum();

    Ok(DashboardSummary {
        date: date.to_string(),
        total,
        active,
        by_status,
    })
}

/// Utilization of every active department, busiest first.
pub fn department_loads(db: &Database) -> DbResult<Vec<DepartmentLoad>> {
    let counts = db.active_ticket_counts()?;
    let mut loads: Vec<DepartmentLoad> = db
        .list_active_departments()?
        .into_iter()
        .map(|department| {
            let active = counts
                .iter()
                .find(|(id, _)| *id == department.id)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            DepartmentLoad::new(department, active)
        })
        .collect();

    loads.sort_by(|a, b| {
        b.utilization_percent
            .cmp(&a.utilization_percent)
            .then_with(|| a.department.name.cmp(&b.department.name))
    });
    Ok(loads)
}
