use serde::Deserialize;

use scrapelab_core::{Result, ScrapeLabError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub sim: SimSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            sim: SimSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ScrapeLabError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.sim.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Simulation knobs. The cache hit ratio and background error chance are
/// arbitrary demo constants carried over from the reference deployment;
/// they are config fields precisely so nobody has to treat them as truth.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimSection {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_cache_hit_ratio")]
    pub cache_hit_ratio: f64,

    #[serde(default = "default_background_error_chance")]
    pub background_error_chance: f64,

    #[serde(default = "default_db_delay_min_ms")]
    pub db_delay_min_ms: u64,

    #[serde(default = "default_db_delay_max_ms")]
    pub db_delay_max_ms: u64,
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            cache_hit_ratio: default_cache_hit_ratio(),
            background_error_chance: default_background_error_chance(),
            db_delay_min_ms: default_db_delay_min_ms(),
            db_delay_max_ms: default_db_delay_max_ms(),
        }
    }
}

impl SimSection {
    pub fn validate(&self) -> Result<()> {
        if !(500..=60000).contains(&self.tick_interval_ms) {
            return Err(ScrapeLabError::Config(
                "sim.tick_interval_ms must be between 500 and 60000".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.cache_hit_ratio) {
            return Err(ScrapeLabError::Config(
                "sim.cache_hit_ratio must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.background_error_chance) {
            return Err(ScrapeLabError::Config(
                "sim.background_error_chance must be between 0.0 and 1.0".into(),
            ));
        }
        if self.db_delay_min_ms >= self.db_delay_max_ms {
            return Err(ScrapeLabError::Config(
                "sim.db_delay_min_ms must be less than db_delay_max_ms".into(),
            ));
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}
fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_tick_interval_ms() -> u64 {
    5000
}
fn default_cache_hit_ratio() -> f64 {
    0.7
}
fn default_background_error_chance() -> f64 {
    0.2
}
fn default_db_delay_min_ms() -> u64 {
    5
}
fn default_db_delay_max_ms() -> u64 {
    150
}
