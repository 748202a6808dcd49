use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

fn holder() -> &'static ArcSwap<StaticConfig> {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
}

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults when
/// `init_config` has not run (unit tests, benches).
pub fn get_config() -> Arc<StaticConfig> {
    holder().load_full()
}

/// Initialize the global configuration
///
/// Loads `path` (default "config.toml") plus `SNAPLINK__*` environment
/// overrides. A missing file means in-memory defaults.
pub fn init_config(path: Option<&str>) -> Result<Arc<StaticConfig>> {
    let config = StaticConfig::load(path)?;
    Ok(set_config(config))
}

/// Replace the global configuration wholesale.
pub fn set_config(config: StaticConfig) -> Arc<StaticConfig> {
    let config = Arc::new(config);
    holder().store(Arc::clone(&config));
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_config_is_visible_to_readers() {
        let mut config = StaticConfig::default();
        config.server.port = 18081;
        let stored = set_config(config);

        assert_eq!(stored.server.port, 18081);
        assert_eq!(get_config().server.port, 18081);
    }
}
