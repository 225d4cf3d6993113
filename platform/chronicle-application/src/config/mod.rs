use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub run: RunConfig,
    pub sources: SourcesConfig,
    pub replay: ReplayConfig,
    pub bars: Option<BarsConfig>,
    pub sizing: Option<SizingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub run_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    pub tick_dir: String,
    pub symbols: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReplayConfig {
    /// Simulated time advanced per `play_to` call, e.g. "1m" or "30s".
    pub step: String,
    /// Stop once simulated time passes this point ("YYYY-MM-DD HH:MM:SS").
    pub until: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct BarsConfig {
    pub intervals: Option<Vec<String>>,
    pub time_bar_seconds: Option<u32>,
    pub sma_window: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SizingConfig {
    pub multiplier_threshold: Option<i64>,
    pub min_size: Option<i64>,
    pub max_position: Option<i64>,
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))?;
    Ok((config, contents))
}
