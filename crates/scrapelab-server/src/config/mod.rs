//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use scrapelab_core::{Result, ScrapeLabError};

pub use schema::{ServerConfig, ServerSection, SimSection};

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ScrapeLabError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

/// Load from `path` if it exists, else fall back to defaults. A present
/// but malformed file is still a hard error; only absence is forgiven.
pub fn load_or_default(path: &str) -> Result<ServerConfig> {
    if Path::new(path).exists() {
        load_from_file(path)
    } else {
        tracing::info!(path, "config file not found, using defaults");
        Ok(ServerConfig::default())
    }
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| ScrapeLabError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
