//! Department model.

use serde::{Deserialize, Serialize};

/// A hospital department that tickets are issued against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Department {
    /// UUID
    pub id: String,
    /// Display name; its first letter becomes the queue-number prefix
    pub name: String,
    /// Optional description shown on the registration form
    pub description: Option<String>,
    /// Configured maximum concurrent active tickets (utilization display only,
    /// not a hard admission limit)
    pub max_capacity: u32,
    /// Inactive departments are hidden from the registration form
    pub active: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Department {
    /// Create a new active department.
    pub fn new(name: String, max_capacity: u32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: None,
            max_capacity,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Queue-number prefix: uppercase first letter of the name.
    ///
    /// Falls back to 'X' for an empty name so malformed admin input never
    /// produces an unprefixed queue number.
    pub fn queue_prefix(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('X')
    }
}
