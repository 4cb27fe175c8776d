//! Auth account storage.

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{Database, DbResult};

/// An auth identity row. Holds only credentials; profile data lives in the
/// patient and staff tables, linked by `account_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// UUID
    pub id: String,
    /// Sign-in email, unique (case-insensitive)
    pub email: String,
    /// PBKDF2 password hash in PHC string format
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: String,
}

impl Account {
    /// Create a new account with a precomputed password hash.
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Database {
    /// Insert a new account. Fails with a unique violation if the email is
    /// already registered.
    pub fn insert_account(&self, account: &Account) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO accounts (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                account.id,
                account.email,
                account.password_hash,
                account.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an account by ID.
    pub fn get_account(&self, id: &str) -> DbResult<Option<Account>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM accounts WHERE id = ?",
                [id],
                account_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get an account by email (case-insensitive).
    pub fn get_account_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        self.conn
            .query_row(
                "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?",
                [email],
                account_from_row,
            )
            .optional()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get_by_email() {
        let db = setup_db();

        let account = Account::new("desk@example.org".into(), "hash".into());
        db.insert_account(&account).unwrap();

        let retrieved = db.get_account_by_email("desk@example.org").unwrap().unwrap();
        assert_eq!(retrieved.id, account.id);

        // COLLATE NOCASE on the email column
        let upper = db.get_account_by_email("DESK@example.org").unwrap();
        assert!(upper.is_some());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = setup_db();

        db.insert_account(&Account::new("desk@example.org".into(), "hash".into()))
            .unwrap();
        let err = db
            .insert_account(&Account::new("Desk@Example.org".into(), "hash".into()))
            .unwrap_err();
        assert!(err.is_unique_violation());
    }
}
