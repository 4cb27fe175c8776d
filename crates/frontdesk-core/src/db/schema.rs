//! SQLite schema definition.

/// Complete database schema for the front desk.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    date_of_birth TEXT,
    gender TEXT,
    phone TEXT,
    email TEXT,
    national_id TEXT,
    medical_record_number TEXT,
    special_needs INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_national_id ON patients(national_id);
CREATE INDEX IF NOT EXISTS idx_patients_mrn ON patients(medical_record_number);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(full_name);

-- ============================================================================
-- Departments
-- ============================================================================

CREATE TABLE IF NOT EXISTS departments (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    max_capacity INTEGER NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_departments_active ON departments(active);

-- ============================================================================
-- Staff
-- ============================================================================

CREATE TABLE IF NOT EXISTS staff (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    email TEXT,
    role TEXT NOT NULL CHECK (role IN ('admin', 'receptionist', 'doctor', 'nurse', 'other')),
    department_id TEXT REFERENCES departments(id),
    active INTEGER NOT NULL DEFAULT 1,
    account_id TEXT REFERENCES accounts(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_staff_department ON staff(department_id);
CREATE INDEX IF NOT EXISTS idx_staff_account ON staff(account_id);

-- ============================================================================
-- Auth Accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Tickets
-- ============================================================================

CREATE TABLE IF NOT EXISTS tickets (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    department_id TEXT NOT NULL REFERENCES departments(id),
    assigned_date TEXT NOT NULL,                 -- YYYY-MM-DD
    queue_number TEXT NOT NULL,                  -- e.g. P005
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN
        ('pending', 'confirmed', 'checked_in', 'called', 'completed', 'cancelled', 'no_show')),
    priority TEXT NOT NULL DEFAULT 'normal' CHECK (priority IN ('normal', 'high', 'emergency')),
    reason TEXT,
    confirmed_at TEXT,
    checked_in_at TEXT,
    called_at TEXT,
    completed_at TEXT,
    cancelled_at TEXT,
    cancellation_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (department_id, assigned_date, queue_number)
);

CREATE INDEX IF NOT EXISTS idx_tickets_dept_date ON tickets(department_id, assigned_date);
CREATE INDEX IF NOT EXISTS idx_tickets_status_called ON tickets(status, called_at);
CREATE INDEX IF NOT EXISTS idx_tickets_patient ON tickets(patient_id);

-- called_at is stamped with database time, never by the application, so the
-- now-serving countdown is immune to client clock skew.
CREATE TRIGGER IF NOT EXISTS tickets_stamp_called_at
AFTER UPDATE OF status ON tickets
WHEN new.status = 'called' AND old.status != 'called'
BEGIN
    UPDATE tickets
    SET called_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
    WHERE id = new.id;
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    fn seed_ticket(conn: &Connection) {
        conn.execute(
            "INSERT INTO patients (id, full_name) VALUES ('p1', 'Test Patient')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO departments (id, name) VALUES ('d1', 'Pediatrics')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO tickets (id, patient_id, department_id, assigned_date, queue_number)
             VALUES ('t1', 'p1', 'd1', '2024-05-02', 'P001')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_called_at_trigger() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        seed_ticket(&conn);

        let called_at: Option<String> = conn
            .query_row("SELECT called_at FROM tickets WHERE id = 't1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(called_at.is_none());

        conn.execute("UPDATE tickets SET status = 'called' WHERE id = 't1'", [])
            .unwrap();

        let called_at: Option<String> = conn
            .query_row("SELECT called_at FROM tickets WHERE id = 't1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        let called_at = called_at.expect("trigger should stamp called_at");
        // RFC 3339 UTC, parseable without zone guessing
        assert!(chrono::DateTime::parse_from_rfc3339(&called_at).is_ok());
    }

    #[test]
    fn test_queue_number_unique_per_department_and_date() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        seed_ticket(&conn);

        // Same department and date: duplicate number rejected
        let dup = conn.execute(
            "INSERT INTO tickets (id, patient_id, department_id, assigned_date, queue_number)
             VALUES ('t2', 'p1', 'd1', '2024-05-02', 'P001')",
            [],
        );
        assert!(dup.is_err());

        // Different date: same number is fine
        let next_day = conn.execute(
            "INSERT INTO tickets (id, patient_id, department_id, assigned_date, queue_number)
             VALUES ('t3', 'p1', 'd1', '2024-05-03', 'P001')",
            [],
        );
        assert!(next_day.is_ok());
    }

    #[test]
    fn test_status_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        seed_ticket(&conn);

        // 'waiting' was an inconsistency in the original UI; only 'pending'
        // is a valid initial status
        let result = conn.execute("UPDATE tickets SET status = 'waiting' WHERE id = 't1'", []);
        assert!(result.is_err());
    }
}
