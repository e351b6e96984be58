use std::path::PathBuf;

use chrono::NaiveDate;

/// Application-level constants
pub const APP_NAME: &str = "Fisiorec";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filename prefix for backup snapshots.
const BACKUP_PREFIX: &str = "fisiorec";

/// Get the application data directory
/// ~/Fisiorec/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Fisiorec")
}

/// Get the database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("expedientes.db")
}

/// Get the directory backup snapshots are written to
pub fn backups_dir() -> PathBuf {
    app_data_dir().join("backups")
}

/// Backup filename for a given export date: `fisiorec_backup_<YYYY-MM-DD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{BACKUP_PREFIX}_backup_{date}.json")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "fisiorec=info"
}
