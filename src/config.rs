use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "HealthGuide";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of entries shown in the recent-entries list.
pub const RECENT_ENTRIES: usize = 10;

/// Window (in entries) used for vital trend series.
pub const TREND_WINDOW: usize = 30;

/// Get the application data directory
/// Local data dir on all platforms; everything stays on this device.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the journal database path
pub fn journal_db_path() -> PathBuf {
    app_data_dir().join("journal.db")
}

/// Get the directory holding optional rule table overrides
pub fn rules_dir() -> PathBuf {
    app_data_dir().join("rules")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "healthguide_lib=debug,info"
    } else {
        "healthguide_lib=info,warn"
    }
}
