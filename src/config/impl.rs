use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults (plus environment)
/// when `init_config` was never called.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::load()))
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" in the current directory).
/// If the file doesn't exist, uses in-memory defaults. Only the first call
/// has an effect.
///
/// # Examples
/// ```no_run
/// use agrirelay::config::init_config;
/// init_config(Some("relay.toml"));
/// ```
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| {
        let config = match path {
            Some(p) => StaticConfig::load_from(p),
            None => StaticConfig::load(),
        };
        ArcSwap::from_pointee(config)
    });
}
