//! Patient models.

use serde::{Deserialize, Serialize};

/// A registered patient.
///
/// Patients are created the first time they submit a visit request; repeat
/// visits are matched on national ID or medical record number and update the
/// existing row in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// UUID, generated on first registration
    pub id: String,
    /// Full legal name
    pub full_name: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: Option<String>,
    /// Gender as entered on the form
    pub gender: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// National ID number (identity match key)
    pub national_id: Option<String>,
    /// Hospital medical record number (identity match key)
    pub medical_record_number: Option<String>,
    /// Needs assistance (wheelchair, interpreter, etc.)
    pub special_needs: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with the required field.
    pub fn new(full_name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            date_of_birth: None,
            gender: None,
            phone: None,
            email: None,
            national_id: None,
            medical_record_number: None,
            special_needs: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
