//! Authentication: account registration, sign-in, and sessions.

pub mod access;
mod password;

pub use access::{allowed, allowed_sections, AdminSection};
pub use password::{hash_password, verify_password, PasswordError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::db::{Account, Database, DbError};
use crate::models::{Patient, Staff};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth errors. Sign-in failures of any kind collapse into
/// `InvalidCredentials` so the message never leaks whether an email is
/// registered.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// The profile row joined to a signed-in account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SessionProfile {
    /// Account belongs to a staff member
    Staff(Staff),
    /// Account belongs to a registered patient
    Patient(Patient),
    /// Account exists but no profile row is linked yet
    Unlinked,
}

/// A signed-in session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub account_id: String,
    pub email: String,
    pub profile: SessionProfile,
    /// Sign-in timestamp
    pub started_at: String,
}

impl Session {
    /// The staff profile, if this session belongs to staff.
    pub fn staff(&self) -> Option<&Staff> {
        match &self.profile {
            SessionProfile::Staff(staff) => Some(staff),
            _ => None,
        }
    }
}

fn validate_email(email: &str) -> AuthResult<()> {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.')
    {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}

/// Register a new account.
pub fn sign_up(db: &Database, email: &str, password: &str) -> AuthResult<Account> {
    validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }

    let account = Account::new(email.trim().to_string(), hash_password(password)?);
    match db.insert_account(&account) {
        Ok(()) => Ok(account),
        Err(e) if e.is_unique_violation() => Err(AuthError::EmailTaken),
        Err(e) => Err(e.into()),
    }
}

/// Sign in with email and password, joining the account to its staff or
/// patient profile row.
pub fn sign_in(db: &Database, email: &str, password: &str) -> AuthResult<Session> {
    let account = match db.get_account_by_email(email.trim())? {
        Some(account) => account,
        None => {
            warn!(email = email.trim(), "sign-in attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(password, &account.password_hash) {
        warn!(email = %account.email, "sign-in with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let profile = load_profile(db, &account)?;
    Ok(Session {
        account_id: account.id,
        email: account.email,
        profile,
        started_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Join an account to its profile row: staff linked by account id first,
/// then patient matched by email.
fn load_profile(db: &Database, account: &Account) -> AuthResult<SessionProfile> {
    if let Some(staff) = db.get_staff_by_account(&account.id)? {
        return Ok(SessionProfile::Staff(staff));
    }
    Ok(match db.get_patient_by_email(&account.email)? {
        Some(patient) => SessionProfile::Patient(patient),
        None => SessionProfile::Unlinked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffRole;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_sign_up_and_in() {
        let db = setup_db();

        sign_up(&db, "desk@example.org", "letmein-please").unwrap();
        let session = sign_in(&db, "desk@example.org", "letmein-please").unwrap();
        assert_eq!(session.email, "desk@example.org");
        assert_eq!(session.profile, SessionProfile::Unlinked);
    }

    #[test]
    fn test_invalid_credentials_single_message() {
        let db = setup_db();
        sign_up(&db, "desk@example.org", "letmein-please").unwrap();

        // Wrong password and unknown email produce the identical message
        let wrong_pw = sign_in(&db, "desk@example.org", "nope-nope").unwrap_err();
        let unknown = sign_in(&db, "ghost@example.org", "letmein-please").unwrap_err();
        assert_eq!(wrong_pw.to_string(), "Invalid email or password");
        assert_eq!(unknown.to_string(), wrong_pw.to_string());
    }

    #[test]
    fn test_duplicate_email_maps_to_email_taken() {
        let db = setup_db();
        sign_up(&db, "desk@example.org", "letmein-please").unwrap();

        let err = sign_up(&db, "Desk@Example.org", "another-pass").unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn test_validation_before_any_write() {
        let db = setup_db();

        assert!(matches!(
            sign_up(&db, "not-an-email", "letmein-please"),
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            sign_up(&db, "desk@example.org", "short"),
            Err(AuthError::PasswordTooShort)
        ));
        assert!(db.get_account_by_email("desk@example.org").unwrap().is_none());
    }

    #[test]
    fn test_session_joins_staff_profile() {
        let db = setup_db();

        let account = sign_up(&db, "nokafor@example.org", "letmein-please").unwrap();
        let mut staff = Staff::new("Dr. Ngozi Okafor".into(), "nokafor".into(), StaffRole::Doctor);
        staff.account_id = Some(account.id.clone());
        db.insert_staff(&staff).unwrap();

        let session = sign_in(&db, "nokafor@example.org", "letmein-please").unwrap();
        let joined = session.staff().expect("staff profile");
        assert_eq!(joined.username, "nokafor");
    }

    #[test]
    fn test_session_joins_patient_profile_by_email() {
        let db = setup_db();

        let mut patient = Patient::new("Amira Hassan".into());
        patient.email = Some("amira@example.org".into());
        db.insert_patient(&patient).unwrap();

        sign_up(&db, "amira@example.org", "letmein-please").unwrap();
        let session = sign_in(&db, "amira@example.org", "letmein-please").unwrap();
        assert!(matches!(session.profile, SessionProfile::Patient(ref p) if p.id == patient.id));
    }
}
