use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{Consultation, ConsultationEntry};

/// Insert a new consultation and return the store-assigned id.
///
/// The patients foreign key is enforced here: logging a visit against an
/// unknown patient id fails at insert time.
pub fn insert_consultation(
    conn: &Connection,
    entry: &ConsultationEntry,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO consultations (patient_id, date, notes) VALUES (?1, ?2, ?3)",
        params![entry.patient_id, entry.date.to_string(), entry.notes],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a consultation keeping its existing id (backup restore path).
pub fn insert_consultation_with_id(
    conn: &Connection,
    consultation: &Consultation,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultations (id, patient_id, date, notes) VALUES (?1, ?2, ?3, ?4)",
        params![
            consultation.id,
            consultation.patient_id,
            consultation.date.to_string(),
            consultation.notes,
        ],
    )?;
    Ok(())
}

/// All consultations for one patient, most recent first.
///
/// Equal dates keep retrieval order.
pub fn get_consultations_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Consultation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, date, notes
         FROM consultations WHERE patient_id = ?1 ORDER BY date DESC",
    )?;

    let rows = stmt.query_map(params![patient_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut consultations = Vec::new();
    for row in rows {
        let (id, patient_id, date, notes) = row?;
        consultations.push(Consultation {
            id,
            patient_id,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
            notes,
        });
    }
    Ok(consultations)
}

/// Every consultation in the store, table order (backup export path).
pub fn get_all_consultations(conn: &Connection) -> Result<Vec<Consultation>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, patient_id, date, notes FROM consultations")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut consultations = Vec::new();
    for row in rows {
        let (id, patient_id, date, notes) = row?;
        consultations.push(Consultation {
            id,
            patient_id,
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap_or_default(),
            notes,
        });
    }
    Ok(consultations)
}

/// Delete every consultation belonging to one patient.
/// Returns how many rows were removed.
pub fn delete_consultations_by_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM consultations WHERE patient_id = ?1",
        params![patient_id],
    )?;
    Ok(deleted)
}

pub fn count_consultations(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM consultations", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::patient::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::PatientEntry;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_patient(conn: &Connection, name: &str) -> i64 {
        insert_patient(
            conn,
            &PatientEntry {
                name: name.into(),
                birth_date: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap(),
                consultation_reason: String::new(),
                diagnosis: String::new(),
                history: String::new(),
            },
        )
        .unwrap()
    }

    fn entry(patient_id: i64, date: &str, notes: &str) -> ConsultationEntry {
        ConsultationEntry {
            patient_id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            notes: notes.into(),
        }
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let conn = test_db();
        let pid = make_patient(&conn, "Ana Ruiz");

        let a = insert_consultation(&conn, &entry(pid, "2024-01-05", "x")).unwrap();
        let b = insert_consultation(&conn, &entry(pid, "2024-03-01", "y")).unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn insert_against_unknown_patient_fails() {
        let conn = test_db();
        let result = insert_consultation(&conn, &entry(99, "2024-01-05", "x"));
        assert!(matches!(result, Err(DatabaseError::Sqlite(_))));
    }

    #[test]
    fn fetch_is_date_descending() {
        let conn = test_db();
        let pid = make_patient(&conn, "Ana Ruiz");
        insert_consultation(&conn, &entry(pid, "2024-01-05", "x")).unwrap();
        insert_consultation(&conn, &entry(pid, "2024-03-01", "y")).unwrap();

        let list = get_consultations_by_patient(&conn, pid).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].date.to_string(), "2024-03-01");
        assert_eq!(list[0].notes, "y");
        assert_eq!(list[1].date.to_string(), "2024-01-05");
        assert_eq!(list[1].notes, "x");
    }

    #[test]
    fn fetch_handles_duplicate_dates() {
        let conn = test_db();
        let pid = make_patient(&conn, "Ana Ruiz");
        insert_consultation(&conn, &entry(pid, "2024-02-10", "a")).unwrap();
        insert_consultation(&conn, &entry(pid, "2024-03-01", "b")).unwrap();
        insert_consultation(&conn, &entry(pid, "2024-02-10", "c")).unwrap();

        let list = get_consultations_by_patient(&conn, pid).unwrap();
        assert_eq!(list.len(), 3);
        for pair in list.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
        assert_eq!(list[0].notes, "b");
    }

    #[test]
    fn fetch_is_scoped_to_one_patient() {
        let conn = test_db();
        let ana = make_patient(&conn, "Ana Ruiz");
        let luis = make_patient(&conn, "Luis Vega");
        insert_consultation(&conn, &entry(ana, "2024-01-05", "x")).unwrap();
        insert_consultation(&conn, &entry(luis, "2024-01-06", "y")).unwrap();

        let list = get_consultations_by_patient(&conn, ana).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].patient_id, ana);
    }

    #[test]
    fn purge_by_patient_reports_count() {
        let conn = test_db();
        let pid = make_patient(&conn, "Ana Ruiz");
        insert_consultation(&conn, &entry(pid, "2024-01-05", "x")).unwrap();
        insert_consultation(&conn, &entry(pid, "2024-03-01", "y")).unwrap();

        let purged = delete_consultations_by_patient(&conn, pid).unwrap();
        assert_eq!(purged, 2);
        assert!(get_consultations_by_patient(&conn, pid).unwrap().is_empty());
        assert_eq!(count_consultations(&conn).unwrap(), 0);
    }
}
