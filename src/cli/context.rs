use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use certlist::config::app_config::AppConfig;
use certlist::core::errors::Result;
use certlist::core::services::key_filter_manager::KeyFilterManager;

static CONFIG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Remember the `--config` path for this run.
pub fn init(custom: Option<&str>) {
    let _ = CONFIG_PATH.set(custom.map(PathBuf::from));
}

/// The explicit config path, if one was given.
pub fn config_path() -> Option<&'static Path> {
    CONFIG_PATH.get().and_then(|p| p.as_deref())
}

/// Build a filter manager from the active configuration.
pub fn filter_manager() -> Result<KeyFilterManager> {
    let config = AppConfig::load_or_default(config_path())?;
    let mut manager = KeyFilterManager::new(config.compliance_mode());
    manager.reload(&config.filter_groups);
    Ok(manager)
}
