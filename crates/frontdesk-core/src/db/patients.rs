//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Patient;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        full_name: row.get(1)?,
        date_of_birth: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        national_id: row.get(6)?,
        medical_record_number: row.get(7)?,
        special_needs: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

const PATIENT_COLUMNS: &str = "id, full_name, date_of_birth, gender, phone, email, \
     national_id, medical_record_number, special_needs, created_at, updated_at";

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, full_name, date_of_birth, gender, phone, email,
                national_id, medical_record_number, special_needs,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                patient.id,
                patient.full_name,
                patient.date_of_birth,
                patient.gender,
                patient.phone,
                patient.email,
                patient.national_id,
                patient.medical_record_number,
                patient.special_needs,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update mutable demographic fields of an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                full_name = ?2,
                date_of_birth = ?3,
                gender = ?4,
                phone = ?5,
                email = ?6,
                national_id = ?7,
                medical_record_number = ?8,
                special_needs = ?9,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.full_name,
                patient.date_of_birth,
                patient.gender,
                patient.phone,
                patient.email,
                patient.national_id,
                patient.medical_record_number,
                patient.special_needs,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find a patient by exact national ID or medical record number match.
    ///
    /// Either key may be absent from the lookup; a missing key never matches
    /// a NULL column.
    pub fn find_patient_by_identity(
        &self,
        national_id: Option<&str>,
        medical_record_number: Option<&str>,
    ) -> DbResult<Option<Patient>> {
        if national_id.is_none() && medical_record_number.is_none() {
            return Ok(None);
        }
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {}
                    FROM patients
                    WHERE (national_id = ?1 AND ?1 IS NOT NULL)
                       OR (medical_record_number = ?2 AND ?2 IS NOT NULL)
                    LIMIT 1
                    "#,
                    PATIENT_COLUMNS
                ),
                params![national_id, medical_record_number],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a patient by contact email (used to join auth sessions to a
    /// patient profile).
    pub fn get_patient_by_email(&self, email: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE email = ?", PATIENT_COLUMNS),
                [email],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Search patients by name (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {}
            FROM patients
            WHERE full_name LIKE ?
            ORDER BY full_name
            LIMIT ?
            "#,
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![pattern, limit as i64], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List all patients.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY full_name",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;
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

        let mut patient = Patient::new("Amira Hassan".into());
        patient.phone = Some("+20-100-555-0133".into());
        patient.national_id = Some("29901011234567".into());

        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.full_name, "Amira Hassan");
        assert_eq!(retrieved.phone, Some("+20-100-555-0133".into()));
        assert!(!retrieved.special_needs);
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let mut patient = Patient::new("Amira Hassan".into());
        db.insert_patient(&patient).unwrap();

        patient.phone = Some("+20-100-555-0199".into());
        patient.special_needs = true;
        db.update_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.phone, Some("+20-100-555-0199".into()));
        assert!(retrieved.special_needs);
    }

    #[test]
    fn test_find_by_identity_either_key() {
        let db = setup_db();

        let mut patient = Patient::new("Amira Hassan".into());
        patient.national_id = Some("29901011234567".into());
        patient.medical_record_number = Some("MRN-0042".into());
        db.insert_patient(&patient).unwrap();

        let by_nid = db
            .find_patient_by_identity(Some("29901011234567"), None)
            .unwrap();
        assert_eq!(by_nid.map(|p| p.id), Some(patient.id.clone()));

        let by_mrn = db.find_patient_by_identity(None, Some("MRN-0042")).unwrap();
        assert_eq!(by_mrn.map(|p| p.id), Some(patient.id.clone()));

        let miss = db
            .find_patient_by_identity(Some("00000000000000"), Some("MRN-9999"))
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_find_by_identity_no_keys() {
        let db = setup_db();

        // A patient with no identity keys must never match a keyless lookup
        let patient = Patient::new("Walk In".into());
        db.insert_patient(&patient).unwrap();

        let result = db.find_patient_by_identity(None, None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_search_patients() {
        let db = setup_db();

        db.insert_patient(&Patient::new("Amira Hassan".into())).unwrap();
        db.insert_patient(&Patient::new("Amir Farouk".into())).unwrap();
        db.insert_patient(&Patient::new("Layla Mansour".into())).unwrap();

        let results = db.search_patients("Amir", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|p| p.full_name == "Amira Hassan"));
        assert!(results.iter().any(|p| p.full_name == "Amir Farouk"));
    }
}
