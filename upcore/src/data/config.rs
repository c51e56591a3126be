use anyhow::Result;
use serde::Deserialize;
use slog::{Logger, error, info};
use std::fs;

const DEFAULT_HASH_TABLE_SIZE: usize = 1024;
const DEFAULT_MAX_SHAPED_QUEUES: usize = 64;

/// Runtime settings for one userplane device context.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bucket count shared by the QER index and the related-QER index.
    pub hash_table_size: usize,

    /// Upper bound on concurrently shaped drop queues for the device.
    pub max_shaped_queues: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_table_size: DEFAULT_HASH_TABLE_SIZE,
            max_shaped_queues: DEFAULT_MAX_SHAPED_QUEUES,
        }
    }
}

/// Load device settings from a TOML file.
pub fn load_config_file(filename: &str, logger: &Logger) -> Result<Config> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load config file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let config: Config = toml::from_str(&contents)?;
    info!(logger, "Loaded device config from {filename}");
    Ok(config)
}
