//! Bulk transfer — whole-store JSON snapshot export and destructive restore.
//!
//! Export reads both collections inside one transaction so the snapshot is
//! consistent, then writes pretty-printed JSON to a dated file. Restore is
//! a wholesale replace: parse first, ask the caller's yes/no gate, then
//! clear and rewrite both collections in a single transaction, so a parse
//! failure, a declined gate, or a write failure all leave the prior data
//! intact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::db::{repository, DatabaseError};
use crate::models::{Consultation, Patient};
use crate::store::RecordStore;

// ═══════════════════════════════════════════════════════════
// Error type
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Restore declined before clearing the store")]
    Aborted,
}

// ═══════════════════════════════════════════════════════════
// Snapshot types
// ═══════════════════════════════════════════════════════════

/// The whole store as one JSON document.
///
/// Both arrays default to empty when the key is absent, so a hand-edited
/// or partial file still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub consultations: Vec<Consultation>,
}

impl Snapshot {
    /// Counts for the caller's confirmation dialog.
    pub fn preview(&self) -> SnapshotPreview {
        SnapshotPreview {
            patient_count: self.patients.len(),
            consultation_count: self.consultations.len(),
        }
    }
}

/// What a restore would bring in, shown before the destructive step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPreview {
    pub patient_count: usize,
    pub consultation_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupResult {
    pub backup_path: String,
    pub patient_count: usize,
    pub consultation_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreResult {
    pub patients_restored: usize,
    pub consultations_restored: usize,
}

// ═══════════════════════════════════════════════════════════
// Export
// ═══════════════════════════════════════════════════════════

/// Read the whole store as a consistent snapshot.
///
/// Both collection reads run inside one transaction; a write landing
/// between them cannot tear the snapshot.
pub fn export_snapshot(store: &RecordStore) -> Result<Snapshot, BackupError> {
    let tx = store.connection().unchecked_transaction()?;
    let patients = repository::get_all_patients(&tx)?;
    let consultations = repository::get_all_consultations(&tx)?;
    tx.commit()?;

    Ok(Snapshot {
        patients,
        consultations,
    })
}

/// Serialize a snapshot of the store to pretty-printed JSON.
pub fn export_json(store: &RecordStore) -> Result<String, BackupError> {
    let snapshot = export_snapshot(store)?;
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Write a dated backup file into `dir` and return path + counts.
///
/// Filename follows `<prefix>_backup_<YYYY-MM-DD>.json` with the export
/// date.
pub fn write_backup(
    store: &RecordStore,
    dir: &Path,
    date: NaiveDate,
) -> Result<BackupResult, BackupError> {
    let snapshot = export_snapshot(store)?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    fs::create_dir_all(dir)?;
    let path: PathBuf = dir.join(config::backup_file_name(date));
    fs::write(&path, json)?;

    tracing::info!(
        path = %path.display(),
        patients = snapshot.patients.len(),
        consultations = snapshot.consultations.len(),
        "Backup written"
    );

    Ok(BackupResult {
        backup_path: path.to_string_lossy().into_owned(),
        patient_count: snapshot.patients.len(),
        consultation_count: snapshot.consultations.len(),
    })
}

// ═══════════════════════════════════════════════════════════
// Restore
// ═══════════════════════════════════════════════════════════

/// Parse a snapshot document without touching the store.
pub fn parse_snapshot(json: &str) -> Result<Snapshot, BackupError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a snapshot file without touching the store.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, BackupError> {
    let json = fs::read_to_string(path)?;
    parse_snapshot(&json)
}

/// Wholesale-replace the store with the snapshot's contents.
///
/// Clear and writes run in one transaction: consultations purged before
/// patients (foreign key order), patients restored before consultations.
/// Snapshot ids are preserved verbatim, so references between restored
/// patients and consultations stay valid when both sides were exported
/// together.
pub fn replace_all(store: &RecordStore, snapshot: &Snapshot) -> Result<RestoreResult, BackupError> {
    let tx = store.connection().unchecked_transaction()?;

    tx.execute("DELETE FROM consultations", [])?;
    tx.execute("DELETE FROM patients", [])?;

    for patient in &snapshot.patients {
        repository::insert_patient_with_id(&tx, patient)?;
    }
    for consultation in &snapshot.consultations {
        repository::insert_consultation_with_id(&tx, consultation)?;
    }

    tx.commit()?;

    tracing::info!(
        patients = snapshot.patients.len(),
        consultations = snapshot.consultations.len(),
        "Store replaced from snapshot"
    );

    Ok(RestoreResult {
        patients_restored: snapshot.patients.len(),
        consultations_restored: snapshot.consultations.len(),
    })
}

/// Full restore flow: read the file, parse, put the preview through the
/// caller's yes/no gate, then replace the store. A declined gate returns
/// `BackupError::Aborted` with the store untouched. On success the caller
/// is expected to reload its view from scratch.
pub fn import_file(
    store: &RecordStore,
    path: &Path,
    confirm: impl FnOnce(&SnapshotPreview) -> bool,
) -> Result<RestoreResult, BackupError> {
    let snapshot = read_snapshot(path)?;
    let preview = snapshot.preview();

    if !confirm(&preview) {
        tracing::info!(path = %path.display(), "Restore declined by caller");
        return Err(BackupError::Aborted);
    }

    replace_all(store, &snapshot)
}
