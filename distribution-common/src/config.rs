use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub width: Option<usize>, // falls back to the size preset, then 80
    #[serde(default)]
    pub height: Option<usize>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default = "default_char")]
    pub char: String,
    #[serde(default)]
    pub color: bool,
    #[serde(default = "default_palette")]
    pub palette: String,
    #[serde(default)]
    pub logarithmic: bool,
}

fn default_char() -> String {
    "-".into()
}
fn default_palette() -> String {
    "0,0,32,35,34".into()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            size: None,
            char: default_char(),
            color: false,
            palette: default_palette(),
            logarithmic: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub tokenize: Option<String>,
    #[serde(default = "default_match", rename = "match")]
    pub match_regexp: String,
    #[serde(default)]
    pub graph: Option<String>,
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,
    #[serde(default = "default_prune_interval")]
    pub key_prune_interval: u64,
    #[serde(default = "default_progress_ms")]
    pub progress_interval_ms: u64,
}

fn default_match() -> String {
    ".".into()
}
fn default_max_keys() -> usize {
    5000
}
fn default_prune_interval() -> u64 {
    1_500_000
}
fn default_progress_ms() -> u64 {
    1000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            tokenize: None,
            match_regexp: default_match(),
            graph: None,
            max_keys: default_max_keys(),
            key_prune_interval: default_prune_interval(),
            progress_interval_ms: default_progress_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("distribution")
            .join("config.toml")
    }

    /// Loads the configuration file named by `explicit`, `$DISTRIBUTION_CONFIG`,
    /// or the platform config directory, in that order. A missing file yields
    /// the defaults.
    pub fn load(explicit: Option<&Path>) -> crate::Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match std::env::var("DISTRIBUTION_CONFIG") {
                Ok(env_path) => PathBuf::from(env_path),
                Err(_) => Self::config_path(),
            },
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::DistributionError::Config(e.to_string()))
    }
}
