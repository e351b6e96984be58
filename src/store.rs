//! The record store handle.
//!
//! `RecordStore` is created once at startup and passed by reference into
//! every operation; nothing in the crate holds a global connection. The
//! embedded engine serializes statements on the owned connection, and
//! every mutating call has committed durably by the time it returns.

use std::path::Path;

use rusqlite::params;
use rusqlite::Connection;

use crate::db::{self, repository, DatabaseError};
use crate::models::{Consultation, ConsultationEntry, Patient, PatientEntry};

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = db::open_database(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = db::open_memory_database()?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection (backup module and tests).
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    // ── Patients ────────────────────────────────────────────

    /// Register a new patient. Returns the assigned id.
    pub fn create_patient(&self, entry: &PatientEntry) -> Result<i64, DatabaseError> {
        repository::insert_patient(&self.conn, entry)
    }

    /// Fetch one patient, `None` for an unknown id.
    pub fn patient(&self, id: i64) -> Result<Option<Patient>, DatabaseError> {
        repository::get_patient(&self.conn, id)
    }

    /// All patients, order unspecified.
    pub fn all_patients(&self) -> Result<Vec<Patient>, DatabaseError> {
        repository::get_all_patients(&self.conn)
    }

    /// Replace a stored record wholesale. `NotFound` for an unknown id.
    pub fn update_patient(&self, patient: &Patient) -> Result<(), DatabaseError> {
        repository::update_patient(&self.conn, patient)
    }

    /// Case-folded substring search over patient names.
    ///
    /// The empty query belongs to `all_patients`, not here (caller contract).
    pub fn search_patients(&self, query: &str) -> Result<Vec<Patient>, DatabaseError> {
        repository::search_patients(&self.conn, query)
    }

    /// Delete a patient together with all of their consultations.
    ///
    /// One transaction, consultation purge sequenced before the patient
    /// delete. Returns `false` as an idempotent no-op when the id does not
    /// exist (a second delete racing the first lands here).
    pub fn delete_patient(&self, id: i64) -> Result<bool, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let purged = repository::delete_consultations_by_patient(&tx, id)?;
        let deleted = tx.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
        tx.commit()?;

        if deleted == 0 {
            tracing::debug!(patient_id = id, "Delete for unknown patient id, no-op");
            return Ok(false);
        }
        tracing::info!(
            patient_id = id,
            consultations = purged,
            "Patient cascade-deleted with all consultations"
        );
        Ok(true)
    }

    // ── Consultations ───────────────────────────────────────

    /// Log a dated visit note against an existing patient. Returns the
    /// assigned id.
    pub fn create_consultation(&self, entry: &ConsultationEntry) -> Result<i64, DatabaseError> {
        repository::insert_consultation(&self.conn, entry)
    }

    /// All consultations for one patient, most recent first.
    pub fn consultations_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Consultation>, DatabaseError> {
        repository::get_consultations_by_patient(&self.conn, patient_id)
    }

    // ── Totals ──────────────────────────────────────────────

    pub fn patient_count(&self) -> Result<i64, DatabaseError> {
        repository::count_patients(&self.conn)
    }

    pub fn consultation_count(&self) -> Result<i64, DatabaseError> {
        repository::count_consultations(&self.conn)
    }
}
