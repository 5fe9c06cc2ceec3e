pub mod api; // HTTP surface
pub mod appointment; // Appointment publishing
pub mod assistant; // Chat helper (hosted LLM)
pub mod config;
pub mod core_state;
pub mod db;
pub mod diagnosis; // AI differential diagnosis
pub mod medications; // AI-recommended medications
pub mod models;
pub mod seed;
pub mod timeline;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
