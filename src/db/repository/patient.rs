use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{Patient, PatientEntry};

/// Insert a new patient and return the store-assigned id.
///
/// No validation beyond what the caller supplies: an empty name is the
/// caller's problem, not the store's.
pub fn insert_patient(conn: &Connection, entry: &PatientEntry) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, birth_date, consultation_reason, diagnosis, history)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.name,
            entry.birth_date.to_string(),
            entry.consultation_reason,
            entry.diagnosis,
            entry.history,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a patient keeping its existing id (backup restore path).
pub fn insert_patient_with_id(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, birth_date, consultation_reason, diagnosis, history)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id,
            patient.name,
            patient.birth_date.to_string(),
            patient.consultation_reason,
            patient.diagnosis,
            patient.history,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, consultation_reason, diagnosis, history
         FROM patients WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id], |row| {
        Ok(PatientRow {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_date: row.get(2)?,
            consultation_reason: row.get(3)?,
            diagnosis: row.get(4)?,
            history: row.get(5)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, consultation_reason, diagnosis, history
         FROM patients",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PatientRow {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_date: row.get(2)?,
            consultation_reason: row.get(3)?,
            diagnosis: row.get(4)?,
            history: row.get(5)?,
        })
    })?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

/// Replace the stored record wholesale (full overwrite, not a partial patch).
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE patients SET name = ?2, birth_date = ?3, consultation_reason = ?4,
         diagnosis = ?5, history = ?6
         WHERE id = ?1",
        params![
            patient.id,
            patient.name,
            patient.birth_date.to_string(),
            patient.consultation_reason,
            patient.diagnosis,
            patient.history,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Patient".into(),
            id: patient.id,
        });
    }
    Ok(())
}

/// Case-folded substring search over every patient's name.
///
/// Walks the name index in full and folds in Rust: SQLite's LOWER() only
/// folds ASCII, which loses accented names like "García". The empty query
/// is a caller-contract violation; callers list all patients instead.
pub fn search_patients(conn: &Connection, query: &str) -> Result<Vec<Patient>, DatabaseError> {
    let needle = query.to_lowercase();

    let mut stmt = conn.prepare(
        "SELECT id, name, birth_date, consultation_reason, diagnosis, history
         FROM patients ORDER BY name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PatientRow {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_date: row.get(2)?,
            consultation_reason: row.get(3)?,
            diagnosis: row.get(4)?,
            history: row.get(5)?,
        })
    })?;

    let mut matches = Vec::new();
    for row in rows {
        let row = row?;
        if row.name.to_lowercase().contains(&needle) {
            matches.push(patient_from_row(row)?);
        }
    }
    Ok(matches)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

// Internal row type for Patient mapping
struct PatientRow {
    id: i64,
    name: String,
    birth_date: String,
    consultation_reason: String,
    diagnosis: String,
    history: String,
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: row.id,
        name: row.name,
        birth_date: NaiveDate::parse_from_str(&row.birth_date, "%Y-%m-%d").unwrap_or_default(),
        consultation_reason: row.consultation_reason,
        diagnosis: row.diagnosis,
        history: row.history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn entry(name: &str, birth: &str) -> PatientEntry {
        PatientEntry {
            name: name.into(),
            birth_date: NaiveDate::parse_from_str(birth, "%Y-%m-%d").unwrap(),
            consultation_reason: String::new(),
            diagnosis: String::new(),
            history: String::new(),
        }
    }

    #[test]
    fn insert_and_retrieve_round_trip() {
        let conn = test_db();
        let id = insert_patient(&conn, &entry("Ana Ruiz", "1990-05-10")).unwrap();
        assert_eq!(id, 1);

        let p = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(p.id, id);
        assert_eq!(p.name, "Ana Ruiz");
        assert_eq!(p.birth_date.to_string(), "1990-05-10");
        assert!(p.diagnosis.is_empty());
    }

    #[test]
    fn get_unknown_id_is_absent() {
        let conn = test_db();
        assert!(get_patient(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn ids_are_independent_sequences() {
        let conn = test_db();
        let a = insert_patient(&conn, &entry("Ana Ruiz", "1990-05-10")).unwrap();
        let b = insert_patient(&conn, &entry("Luis Vega", "1985-02-28")).unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let conn = test_db();
        let a = insert_patient(&conn, &entry("Ana Ruiz", "1990-05-10")).unwrap();
        conn.execute("DELETE FROM patients WHERE id = ?1", params![a]).unwrap();
        let b = insert_patient(&conn, &entry("Luis Vega", "1985-02-28")).unwrap();
        assert!(b > a, "id {b} must not reuse deleted id {a}");
    }

    #[test]
    fn update_overwrites_wholesale() {
        let conn = test_db();
        let id = insert_patient(&conn, &entry("Ana Ruiz", "1990-05-10")).unwrap();

        let mut p = get_patient(&conn, id).unwrap().unwrap();
        p.diagnosis = "Lumbalgia".into();
        p.history = "Dolor desde 2023".into();
        update_patient(&conn, &p).unwrap();

        let updated = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(updated.diagnosis, "Lumbalgia");
        assert_eq!(updated.history, "Dolor desde 2023");
        assert_eq!(updated.name, "Ana Ruiz");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let conn = test_db();
        let ghost = Patient {
            id: 99,
            name: "Nadie".into(),
            birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            consultation_reason: String::new(),
            diagnosis: String::new(),
            history: String::new(),
        };
        let result = update_patient(&conn, &ghost);
        assert!(matches!(
            result,
            Err(DatabaseError::NotFound { id: 99, .. })
        ));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let conn = test_db();
        insert_patient(&conn, &entry("Ana Ruiz", "1990-05-10")).unwrap();
        insert_patient(&conn, &entry("Luis Vega", "1985-02-28")).unwrap();
        insert_patient(&conn, &entry("Mariana Cruz", "1978-11-03")).unwrap();

        let hits = search_patients(&conn, "RUI").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ana Ruiz");

        // "ana" is a substring of both "Ana Ruiz" and "Mariana Cruz"
        let hits = search_patients(&conn, "ana").unwrap();
        assert_eq!(hits.len(), 2);

        assert!(search_patients(&conn, "zz").unwrap().is_empty());
    }

    #[test]
    fn search_folds_accented_names() {
        let conn = test_db();
        insert_patient(&conn, &entry("José García", "1962-07-19")).unwrap();

        let hits = search_patients(&conn, "garcía").unwrap();
        assert_eq!(hits.len(), 1);
        let hits = search_patients(&conn, "GARCÍA").unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn insert_with_id_preserves_id() {
        let conn = test_db();
        let p = Patient {
            id: 17,
            name: "Ana Ruiz".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap(),
            consultation_reason: String::new(),
            diagnosis: String::new(),
            history: String::new(),
        };
        insert_patient_with_id(&conn, &p).unwrap();
        assert!(get_patient(&conn, 17).unwrap().is_some());

        // The sequence continues past the restored id
        let next = insert_patient(&conn, &entry("Luis Vega", "1985-02-28")).unwrap();
        assert_eq!(next, 18);
    }

    #[test]
    fn count_reflects_inserts() {
        let conn = test_db();
        assert_eq!(count_patients(&conn).unwrap(), 0);
        insert_patient(&conn, &entry("Ana Ruiz", "1990-05-10")).unwrap();
        assert_eq!(count_patients(&conn).unwrap(), 1);
    }
}
