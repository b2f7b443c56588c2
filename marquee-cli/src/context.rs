use std::path::Path;

use anyhow::{Context, Result};
use marquee::storage::file::FileStorageConfig;
use marquee::{Engine, EngineConfig, StorageConfig};
use tracing::info;

/// Load the engine configuration and open the index.
///
/// Without a config file the defaults apply. An index directory, when
/// given, always selects file storage at that location.
pub fn open_engine(config_path: Option<&Path>, index_dir: Option<&Path>) -> Result<Engine> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = index_dir {
        config.storage = StorageConfig::File(FileStorageConfig::new(dir));
    }
    if matches!(config.storage, StorageConfig::Memory(_)) {
        info!("no index directory configured; using a transient in-memory index");
    }

    Engine::open(config).context("Failed to open index")
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load config")
}
