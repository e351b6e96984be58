use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A patient record ("expediente") as stored.
///
/// Field names serialize camelCase to match the backup file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub consultation_reason: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub history: String,
}

impl Patient {
    /// Age in whole years on the given date. Computed, never stored.
    pub fn age_on(&self, on: NaiveDate) -> i32 {
        let mut age = on.year() - self.birth_date.year();
        if (on.month(), on.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }

    /// Age in whole years today (local calendar).
    pub fn age(&self) -> i32 {
        self.age_on(Local::now().date_naive())
    }
}

/// Input for registering a new patient. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEntry {
    pub name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub consultation_reason: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub history: String,
}
