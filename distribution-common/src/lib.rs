pub mod config;
pub mod settings;
pub use config::Config;
pub use settings::{Colors, Mode, Overrides, Settings, SizePreset, MAX_KEYS_MARGIN};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("line {line}: malformed pre-tallied record: {record:?}")]
    MalformedRecord { line: u64, record: String },
    #[error("line {line}: invalid count in record {record:?}: {source}")]
    InvalidCount {
        line: u64,
        record: String,
        source: std::num::ParseIntError,
    },
}

pub type Result<T> = std::result::Result<T, DistributionError>;
