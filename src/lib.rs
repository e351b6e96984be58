//! Fisiorec — local record store for a physiotherapy practice.
//!
//! Everything lives in one embedded SQLite database: patient records
//! ("expedientes"), their dated consultation notes, and a JSON snapshot
//! backup/restore facility. There is no server and no network protocol;
//! a presentation layer drives [`RecordStore`] and [`backup`] directly
//! and renders whatever they return.

pub mod backup;
pub mod config;
pub mod db;
pub mod models;
pub mod store;

pub use store::RecordStore;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and test harnesses embedding the crate.
///
/// Honors RUST_LOG when set, falls back to [`config::default_log_filter`].
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
