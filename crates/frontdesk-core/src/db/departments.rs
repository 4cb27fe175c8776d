//! Department database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Department;

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        max_capacity: row.get(3)?,
        active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const DEPARTMENT_COLUMNS: &str =
    "id, name, description, max_capacity, active, created_at, updated_at";

impl Database {
    /// Insert a new department.
    pub fn insert_department(&self, department: &Department) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO departments (
                id, name, description, max_capacity, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                department.id,
                department.name,
                department.description,
                department.max_capacity,
                department.active,
                department.created_at,
                department.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing department.
    pub fn update_department(&self, department: &Department) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE departments SET
                name = ?2,
                description = ?3,
                max_capacity = ?4,
                active = ?5,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                department.id,
                department.name,
                department.description,
                department.max_capacity,
                department.active,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a department by ID.
    pub fn get_department(&self, id: &str) -> DbResult<Option<Department>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM departments WHERE id = ?", DEPARTMENT_COLUMNS),
                [id],
                department_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all departments.
    pub fn list_departments(&self) -> DbResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM departments ORDER BY name",
            DEPARTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], department_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List active departments (the ones offered on the registration form).
    pub fn list_active_departments(&self) -> DbResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM departments WHERE active = 1 ORDER BY name",
            DEPARTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], department_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut dept = Department::new("Pediatrics".into(), 30);
        dept.description = Some("Children under 16".into());
        db.insert_department(&dept).unwrap();

        let retrieved = db.get_department(&dept.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Pediatrics");
        assert_eq!(retrieved.max_capacity, 30);
        assert!(retrieved.active);
    }

    #[test]
    fn test_update_department() {
        let db = setup_db();

        let mut dept = Department::new("Pediatrics".into(), 30);
        db.insert_department(&dept).unwrap();

        dept.max_capacity = 45;
        dept.active = false;
        db.update_department(&dept).unwrap();

        let retrieved = db.get_department(&dept.id).unwrap().unwrap();
        assert_eq!(retrieved.max_capacity, 45);
        assert!(!retrieved.active);
    }

    #[test]
    fn test_list_active_only() {
        let db = setup_db();

        let open = Department::new("Cardiology".into(), 20);
        let mut closed = Department::new("Radiology".into(), 15);
        closed.active = false;

        db.insert_department(&open).unwrap();
        db.insert_department(&closed).unwrap();

        let active = db.list_active_departments().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Cardiology");

        let all = db.list_departments().unwrap();
        assert_eq!(all.len(), 2);
    }
}
