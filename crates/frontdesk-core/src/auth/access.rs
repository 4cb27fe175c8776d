//! Role-based access to the admin area.
//!
//! The original deployment relied on backend row rules alone and left the
//! admin routes unguarded; this module is the explicit routing-boundary
//! check.

use serde::{Deserialize, Serialize};

use crate::models::StaffRole;

/// Sections of the admin area, one per admin route.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminSection {
    Dashboard,
    Patients,
    TicketQueue,
    Departments,
    Staff,
}

impl AdminSection {
    /// All sections, in navigation order.
    pub const ALL: [AdminSection; 5] = [
        AdminSection::Dashboard,
        AdminSection::Patients,
        AdminSection::TicketQueue,
        AdminSection::Departments,
        AdminSection::Staff,
    ];
}

/// Whether a role may open an admin section.
///
/// Admins get everything; receptionists the front-desk sections; doctors and
/// nurses only the ticket queue; `other` nothing.
pub fn allowed(role: StaffRole, section: AdminSection) -> bool {
    match role {
        StaffRole::Admin => true,
        StaffRole::Receptionist => matches!(
            section,
            AdminSection::Dashboard | AdminSection::Patients | AdminSection::TicketQueue
        ),
        StaffRole::Doctor | StaffRole::Nurse => matches!(section, AdminSection::TicketQueue),
        StaffRole::Other => false,
    }
}

/// The sections a role may open, for rendering navigation.
pub fn allowed_sections(role: StaffRole) -> Vec<AdminSection> {
    AdminSection::ALL
        .into_iter()
        .filter(|section| allowed(role, *section))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_everything() {
        for section in AdminSection::ALL {
            assert!(allowed(StaffRole::Admin, section));
        }
    }

    #[test]
    fn test_receptionist_cannot_manage_structure() {
        assert!(allowed(StaffRole::Receptionist, AdminSection::TicketQueue));
        assert!(allowed(StaffRole::Receptionist, AdminSection::Patients));
        assert!(!allowed(StaffRole::Receptionist, AdminSection::Departments));
        assert!(!allowed(StaffRole::Receptionist, AdminSection::Staff));
    }

    #[test]
    fn test_clinical_roles_get_queue_only() {
        for role in [StaffRole::Doctor, StaffRole::Nurse] {
            assert_eq!(allowed_sections(role), vec![AdminSection::TicketQueue]);
        }
    }

    #[test]
    fn test_other_role_locked_out() {
        assert!(allowed_sections(StaffRole::Other).is_empty());
    }
}
