//! Staff database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Staff, StaffRole};

fn staff_from_row(row: &Row<'_>) -> rusqlite::Result<StaffRow> {
    Ok(StaffRow {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        role: row.get(4)?,
        department_id: row.get(5)?,
        active: row.get(6)?,
        account_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const STAFF_COLUMNS: &str =
    "id, name, username, email, role, department_id, active, account_id, created_at, updated_at";

impl Database {
    /// Insert a new staff member.
    pub fn insert_staff(&self, staff: &Staff) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO staff (
                id, name, username, email, role, department_id, active,
                account_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                staff.id,
                staff.name,
                staff.username,
                staff.email,
                staff.role.as_str(),
                staff.department_id,
                staff.active,
                staff.account_id,
                staff.created_at,
                staff.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing staff member.
    pub fn update_staff(&self, staff: &Staff) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE staff SET
                name = ?2,
                username = ?3,
                email = ?4,
                role = ?5,
                department_id = ?6,
                active = ?7,
                account_id = ?8,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                staff.id,
                staff.name,
                staff.username,
                staff.email,
                staff.role.as_str(),
                staff.department_id,
                staff.active,
                staff.account_id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a staff member by ID.
    pub fn get_staff(&self, id: &str) -> DbResult<Option<Staff>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM staff WHERE id = ?", STAFF_COLUMNS),
                [id],
                staff_from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get the staff member linked to an auth account, if any.
    pub fn get_staff_by_account(&self, account_id: &str) -> DbResult<Option<Staff>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM staff WHERE account_id = ?", STAFF_COLUMNS),
                [account_id],
                staff_from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all staff members.
    pub fn list_staff(&self) -> DbResult<Vec<Staff>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM staff ORDER BY name", STAFF_COLUMNS))?;
        let rows = stmt.query_map([], staff_from_row)?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row?.try_into()?);
        }
        Ok(members)
    }
}

/// Intermediate row struct for database mapping.
struct StaffRow {
    id: String,
    name: String,
    username: String,
    email: Option<String>,
    role: String,
    department_id: Option<String>,
    active: bool,
    account_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<StaffRow> for Staff {
    type Error = DbError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        let role = StaffRole::parse(&row.role)
            .ok_or_else(|| DbError::Constraint(format!("Unknown staff role: {}", row.role)))?;
        Ok(Staff {
            id: row.id,
            name: row.name,
            username: row.username,
            email: row.email,
            role,
            department_id: row.department_id,
            active: row.active,
            account_id: row.account_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
