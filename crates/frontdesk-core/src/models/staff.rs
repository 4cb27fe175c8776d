//! Staff models.

use serde::{Deserialize, Serialize};

/// Staff role, used for admin-area access decisions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    Receptionist,
    Doctor,
    Nurse,
    Other,
}

impl StaffRole {
    /// Canonical string literal stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Receptionist => "receptionist",
            StaffRole::Doctor => "doctor",
            StaffRole::Nurse => "nurse",
            StaffRole::Other => "other",
        }
    }

    /// Parse the stored literal.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(StaffRole::Admin),
            "receptionist" => Some(StaffRole::Receptionist),
            "doctor" => Some(StaffRole::Doctor),
            "nurse" => Some(StaffRole::Nurse),
            "other" => Some(StaffRole::Other),
            _ => None,
        }
    }
}

/// A staff member, optionally linked to an auth account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    /// UUID
    pub id: String,
    /// Display name
    pub name: String,
    /// Login/display username, unique
    pub username: String,
    /// Work email
    pub email: Option<String>,
    /// Role for access decisions
    pub role: StaffRole,
    /// Home department, if any
    pub department_id: Option<String>,
    /// Inactive staff keep their rows but cannot sign in
    pub active: bool,
    /// Linked auth account id, set once the member registers credentials
    pub account_id: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Staff {
    /// Create a new active staff member.
    pub fn new(name: String, username: String, role: StaffRole) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            username,
            email: None,
            role,
            department_id: None,
            active: true,
            account_id: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            StaffRole::Admin,
            StaffRole::Receptionist,
            StaffRole::Doctor,
            StaffRole::Nurse,
            StaffRole::Other,
        ] {
            assert_eq!(StaffRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(StaffRole::parse("janitor"), None);
    }

    #[test]
    fn test_new_staff() {
        let staff = Staff::new("Dr. Ngozi Okafor".into(), "nokafor".into(), StaffRole::Doctor);
        assert!(staff.active);
        assert!(staff.account_id.is_none());
        assert_eq!(staff.role, StaffRole::Doctor);
    }
}
