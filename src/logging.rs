//! Console logging.
//!
//! The library only emits `tracing` events; binaries and tests opt in to
//! seeing them by calling [`init`].

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Installs a colored fmt subscriber.
///
/// `HFLAV_LOG`, then `RUST_LOG`, take precedence over `default_filter`.
/// Calling this more than once is harmless: later calls return `false` and
/// leave the first subscriber in place.
pub fn init(default_filter: &str) -> bool {
    let filter = std::env::var("HFLAV_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// [`init`] with `settings.log_filter` as the default filter.
pub fn init_from(settings: &Settings) -> bool {
    init(&settings.log_filter)
}
