pub mod config;
pub mod core_state; // Host-facing shared state
pub mod db;
pub mod intelligence; // Advice, red flags, vital checks
pub mod journal;
pub mod models;
pub mod vocabulary;

use tracing_subscriber::EnvFilter;

pub use core_state::{CoreError, CoreState};
pub use journal::{submit, JournalStore, Submission, DISCLAIMER};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}
