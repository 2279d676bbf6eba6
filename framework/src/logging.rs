//! Tracing subscriber setup

use crate::config::env::env;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Logging settings
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive, e.g. `info` or `listkit=debug,sqlx=warn`
    pub level: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: env("LOG_LEVEL", "info".to_string()),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over `config.level`. Only the first call has any effect.
pub fn init(config: &LogConfig) {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber installed elsewhere (e.g. by a test harness) is left alone.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
