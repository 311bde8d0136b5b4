use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Config;

/// Get the canonical config file path (~/.healthdash/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".healthdash").join("config.json"))
}

/// Load configuration from ~/.healthdash/config.json
pub fn load_config() -> Result<Config, String> {
    load_config_from(&config_path()?)
}

/// Load configuration from an explicit path.
pub fn load_config_from(config_path: &Path) -> Result<Config, String> {
    if !config_path.exists() {
        return Err(format!(
            "Config file not found at {}. Create it with: {{ \"apiBaseUrl\": \"http://localhost:8000\" }}",
            config_path.display()
        ));
    }

    let content =
        fs::read_to_string(config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    let config: Config =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;

    if url::Url::parse(&config.api_base_url).is_err() {
        return Err(format!("Invalid apiBaseUrl: {}", config.api_base_url));
    }

    Ok(config)
}

/// Load configuration, falling back to defaults when the file is missing or invalid.
pub fn load_config_or_default() -> Config {
    match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::info!("Using default config: {}", e);
            Config::default()
        }
    }
}

/// Monotonic request counter used to drop responses that arrive after a
/// newer request for the same view has started.
#[derive(Debug, Default)]
pub struct RequestEpoch {
    current: AtomicU64,
}

impl RequestEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request and return its ticket. Older tickets stop being current.
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current() == ticket
    }
}
