use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated visit note linked to one patient.
///
/// Consultations are append-only: created against an existing patient,
/// never edited, removed only when their patient is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: i64,
    pub patient_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

/// Input for logging a new consultation. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationEntry {
    pub patient_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}
