use crate::{Config, DistributionError, Result};
use std::time::Duration;
use tracing::debug;

/// Rows kept above the display height when pruning, so a key that shows up
/// late in the stream still has room to climb into the displayed top-N.
pub const MAX_KEYS_MARGIN: usize = 3000;

const DEFAULT_WIDTH: usize = 80;
const DEFAULT_HEIGHT: usize = 15;

/// How input lines become observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Every line is one key.
    Lines,
    /// Lines are split on a regex (or the `white`/`word` shortcut).
    Split { splitter: String },
    /// Pre-tallied input, key first then value.
    KeyValue,
    /// Pre-tallied input, value first then key.
    ValueKey,
}

impl Mode {
    fn resolve(graph: Option<&str>, tokenize: Option<&str>) -> Result<Self> {
        if let Some(g) = graph {
            return match g {
                "kv" => Ok(Mode::KeyValue),
                "vk" | "" => Ok(Mode::ValueKey),
                other => Err(DistributionError::InvalidOption(format!(
                    "graph must be kv or vk, got {other:?}"
                ))),
            };
        }
        Ok(match tokenize {
            Some(s) if !s.is_empty() => Mode::Split { splitter: s.to_owned() },
            _ => Mode::Lines,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Small,
    Medium,
    Large,
    Full,
}

impl SizePreset {
    /// Accepts the long names and their abbreviations (`small`, `sm`, `s`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" | "sm" | "s" => Some(Self::Small),
            "medium" | "med" | "m" => Some(Self::Medium),
            "large" | "lg" | "l" => Some(Self::Large),
            "full" | "fl" | "f" => Some(Self::Full),
            _ => None,
        }
    }

    /// Width and height for this preset. `Full` asks `terminal` for
    /// `(columns, rows)` and leaves room for the header and prompt.
    pub fn dimensions(
        self,
        verbose: bool,
        terminal: impl FnOnce() -> Result<(usize, usize)>,
    ) -> Result<(usize, usize)> {
        match self {
            Self::Small => Ok((60, 10)),
            Self::Medium => Ok((100, 20)),
            Self::Large => Ok((140, 35)),
            Self::Full => {
                let (cols, rows) = terminal()?;
                let mut height = rows.saturating_sub(3);
                if verbose {
                    // room for the summary block
                    height = height.saturating_sub(4);
                }
                Ok((cols.max(40), height.max(10)))
            }
        }
    }
}

/// Escape strings wrapped around each field of a rendered row. All empty when
/// colour is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Colors {
    pub regular: String,
    pub key: String,
    pub count: String,
    pub percent: String,
    pub bar: String,
}

impl Colors {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds ANSI SGR sequences from `regular,key,count,percent,bar` codes.
    pub fn from_palette(palette: &str) -> Result<Self> {
        let codes: Vec<&str> = palette.split(',').map(str::trim).collect();
        if codes.len() < 5 {
            return Err(DistributionError::InvalidOption(format!(
                "palette needs 5 comma-separated codes, got {palette:?}"
            )));
        }
        let sgr = |code: &str| format!("\u{1b}[{code}m");
        Ok(Self {
            regular: sgr(codes[0]),
            key: sgr(codes[1]),
            count: sgr(codes[2]),
            percent: sgr(codes[3]),
            bar: sgr(codes[4]),
        })
    }
}

/// Values given on the command line; each one wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub size: Option<String>,
    pub char: Option<String>,
    pub color: bool,
    pub palette: Option<String>,
    pub logarithmic: bool,
    pub tokenize: Option<String>,
    pub match_regexp: Option<String>,
    pub graph: Option<String>,
    pub max_keys: Option<usize>,
    pub verbose: bool,
}

/// Fully resolved run configuration. Built once, then shared by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub max_keys: usize,
    /// Set when `max_keys` was raised to `height + MAX_KEYS_MARGIN`.
    pub max_keys_raised: bool,
    pub key_prune_interval: u64,
    pub mode: Mode,
    pub match_regexp: String,
    pub glyphs: String,
    pub colors: Colors,
    pub logarithmic: bool,
    pub verbose: bool,
    pub progress_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_keys: 5000,
            max_keys_raised: false,
            key_prune_interval: 1_500_000,
            mode: Mode::Lines,
            match_regexp: ".".into(),
            glyphs: "-".into(),
            colors: Colors::none(),
            logarithmic: false,
            verbose: false,
            progress_interval: Duration::from_secs(1),
        }
    }
}

impl Settings {
    pub fn resolve(
        config: &Config,
        overrides: &Overrides,
        terminal: impl FnOnce() -> Result<(usize, usize)>,
    ) -> Result<Self> {
        let display = &config.display;
        let ingest = &config.ingest;
        let verbose = overrides.verbose || config.verbose;

        let (mut width, mut height) = (DEFAULT_WIDTH, DEFAULT_HEIGHT);
        if let Some(size) = overrides.size.as_deref().or(display.size.as_deref()) {
            let preset = SizePreset::parse(size).ok_or_else(|| {
                DistributionError::InvalidOption(format!("unknown size {size:?}"))
            })?;
            (width, height) = preset.dimensions(verbose, terminal)?;
        }
        // zero means "not given", as with an unset flag
        if let Some(w) = overrides.width.or(display.width).filter(|w| *w > 0) {
            width = w;
        }
        if let Some(h) = overrides.height.or(display.height).filter(|h| *h > 0) {
            height = h;
        }

        let requested = overrides.max_keys.unwrap_or(ingest.max_keys);
        let floor = height + MAX_KEYS_MARGIN;
        let max_keys = requested.max(floor);
        let max_keys_raised = requested < floor;
        if max_keys_raised {
            debug!(requested, max_keys, "raised max_keys to height + margin");
        }

        if ingest.key_prune_interval == 0 {
            return Err(DistributionError::InvalidOption(
                "key_prune_interval must be greater than zero".into(),
            ));
        }

        let mode = Mode::resolve(
            overrides.graph.as_deref().or(ingest.graph.as_deref()),
            overrides.tokenize.as_deref().or(ingest.tokenize.as_deref()),
        )?;

        let palette = overrides.palette.as_deref().unwrap_or(&display.palette);
        let colored = overrides.color || overrides.palette.is_some() || display.color;
        let colors = if colored {
            Colors::from_palette(palette)?
        } else {
            Colors::none()
        };

        let glyphs = overrides.char.clone().unwrap_or_else(|| display.char.clone());
        if glyphs.is_empty() {
            return Err(DistributionError::InvalidOption("char must not be empty".into()));
        }

        Ok(Self {
            width,
            height,
            max_keys,
            max_keys_raised,
            key_prune_interval: ingest.key_prune_interval,
            mode,
            match_regexp: overrides
                .match_regexp
                .clone()
                .unwrap_or_else(|| ingest.match_regexp.clone()),
            glyphs,
            colors,
            logarithmic: overrides.logarithmic || display.logarithmic,
            verbose,
            progress_interval: Duration::from_millis(ingest.progress_interval_ms),
        })
    }
}
