use crate::table::FrequencyTable;
use distribution_common::{DistributionError, Mode, Result, Settings, MAX_KEYS_MARGIN};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::time::{Duration, Instant};
use tracing::debug;

pub const WHITESPACE_SPLIT: &str = r"\s+";
pub const WORD_SPLIT: &str = r"\W";
pub const WORD_MATCH: &str = r"^[A-Z,a-z]+$";
pub const NUM_MATCH: &str = r"^\d+$";

// keys must end in a non-whitespace character
pub const KEY_VALUE_PATTERN: &str = r"^\s*(.*\S)\s+(\d+)$";
pub const VALUE_KEY_PATTERN: &str = r"^\s*(\d+)\s+(.*\S)\s*$";

/// When to prune and how far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrunePolicy {
    pub max_keys: usize,
    /// Observations between prunes.
    pub interval: u64,
}

impl Default for PrunePolicy {
    fn default() -> Self {
        Self { max_keys: 5000, interval: 1_500_000 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Lines, split candidates or records looked at.
    pub examined: u64,
    /// Observations counted; for pre-tallied input the sum of values.
    pub matched: u64,
    pub prunes: u64,
}

/// A finished ingestion: the table plus what it took to build it.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub table: FrequencyTable,
    pub stats: IngestStats,
}

#[derive(Debug, Clone)]
enum Strategy {
    Lines { filter: Regex },
    Split { splitter: Regex, filter: Regex },
    PreTallied { extractor: Regex, key_idx: usize, value_idx: usize },
}

/// Turns a line-oriented reader into a frequency table.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    strategy: Strategy,
    policy: PrunePolicy,
}

fn splitter_regex(splitter: &str) -> Result<Regex> {
    let pattern = match splitter {
        "white" => WHITESPACE_SPLIT,
        "word" => WORD_SPLIT,
        other => other,
    };
    Ok(Regex::new(pattern)?)
}

fn filter_regex(filter: &str) -> Result<Regex> {
    let pattern = match filter {
        "word" => WORD_MATCH,
        "num" | "number" => NUM_MATCH,
        other => other,
    };
    Ok(Regex::new(pattern)?)
}

impl Tokenizer {
    /// One key per line; lines the filter rejects are skipped.
    pub fn lines(filter: &str, policy: PrunePolicy) -> Result<Self> {
        Ok(Self { strategy: Strategy::Lines { filter: filter_regex(filter)? }, policy })
    }

    /// Splits each line on `splitter` and counts the tokens `filter` accepts.
    pub fn split(splitter: &str, filter: &str, policy: PrunePolicy) -> Result<Self> {
        Ok(Self {
            strategy: Strategy::Split {
                splitter: splitter_regex(splitter)?,
                filter: filter_regex(filter)?,
            },
            policy,
        })
    }

    /// Pre-tallied `key value` records; a later record for a key replaces
    /// the earlier one.
    pub fn key_value() -> Result<Self> {
        Self::pre_tallied(KEY_VALUE_PATTERN, 1, 2)
    }

    /// Pre-tallied `value key` records, as printed by `du` or `uniq -c`.
    pub fn value_key() -> Result<Self> {
        Self::pre_tallied(VALUE_KEY_PATTERN, 2, 1)
    }

    fn pre_tallied(pattern: &str, key_idx: usize, value_idx: usize) -> Result<Self> {
        Ok(Self {
            strategy: Strategy::PreTallied { extractor: Regex::new(pattern)?, key_idx, value_idx },
            policy: PrunePolicy::default(),
        })
    }

    /// Builds the tokenizer `settings` describe. `max_keys` never drops
    /// below the display height plus [`MAX_KEYS_MARGIN`].
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let floor = settings.height.saturating_add(MAX_KEYS_MARGIN);
        if settings.max_keys < floor {
            debug!(requested = settings.max_keys, max_keys = floor, "raising max keys to height + margin");
        }
        let policy = PrunePolicy {
            max_keys: settings.max_keys.max(floor),
            interval: settings.key_prune_interval,
        };
        let tokenizer = match &settings.mode {
            Mode::Lines => Self::lines(&settings.match_regexp, policy)?,
            Mode::Split { splitter } => Self::split(splitter, &settings.match_regexp, policy)?,
            Mode::KeyValue => Self::key_value()?,
            Mode::ValueKey => Self::value_key()?,
        };
        debug!(mode = ?settings.mode, ?policy, "tokenizer ready");
        Ok(tokenizer)
    }

    pub fn tokenize<R: BufRead>(&self, reader: R) -> Result<Tally> {
        self.run(reader, None)
    }

    /// Like [`Tokenizer::tokenize`], calling `report` at most once per
    /// `interval` with the running statistics.
    pub fn tokenize_with_progress<R, F>(&self, reader: R, interval: Duration, mut report: F) -> Result<Tally>
    where
        R: BufRead,
        F: FnMut(&IngestStats),
    {
        let report: &mut dyn FnMut(&IngestStats) = &mut report;
        self.run(reader, Some((interval, report)))
    }

    fn run<R: BufRead>(
        &self,
        reader: R,
        mut progress: Option<(Duration, &mut dyn FnMut(&IngestStats))>,
    ) -> Result<Tally> {
        let mut tally = Tally::default();
        let mut since_prune = 0u64;
        let mut next_report = progress.as_ref().map(|(every, _)| Instant::now() + *every);

        for_each_line(reader, |line_no, line| {
            match &self.strategy {
                Strategy::Lines { filter } => {
                    tally.stats.examined += 1;
                    self.count(&mut tally, &mut since_prune, filter, line);
                }
                Strategy::Split { splitter, filter } => {
                    for token in splitter.split(line) {
                        tally.stats.examined += 1;
                        self.count(&mut tally, &mut since_prune, filter, token);
                    }
                }
                Strategy::PreTallied { extractor, key_idx, value_idx } => {
                    tally.stats.examined += 1;
                    let caps = extractor.captures(line).ok_or_else(|| {
                        DistributionError::MalformedRecord { line: line_no, record: line.to_owned() }
                    })?;
                    let (key, value) = match (caps.get(*key_idx), caps.get(*value_idx)) {
                        (Some(k), Some(v)) => (k.as_str(), v.as_str()),
                        _ => {
                            return Err(DistributionError::MalformedRecord {
                                line: line_no,
                                record: line.to_owned(),
                            })
                        }
                    };
                    let value: u64 = value.parse().map_err(|source| DistributionError::InvalidCount {
                        line: line_no,
                        record: line.to_owned(),
                        source,
                    })?;
                    tally.table.assign(key, value);
                    tally.stats.matched = tally.stats.matched.saturating_add(value);
                }
            }

            if let (Some((every, report)), Some(next)) = (progress.as_mut(), next_report.as_mut()) {
                let now = Instant::now();
                if now >= *next {
                    tally.stats.prunes = tally.table.prune_count();
                    report(&tally.stats);
                    *next = now + *every;
                }
            }
            Ok(())
        })?;

        tally.stats.prunes = tally.table.prune_count();
        Ok(tally)
    }

    fn count(&self, tally: &mut Tally, since_prune: &mut u64, filter: &Regex, token: &str) {
        if token.is_empty() || !filter.is_match(token) {
            return;
        }
        tally.stats.matched += 1;
        tally.table.observe(token, 1);
        *since_prune += 1;
        if *since_prune >= self.policy.interval {
            tally.table.prune(self.policy.max_keys);
            *since_prune = 0;
        }
    }
}

/// Feeds each line to `f` with its 1-based number. The trailing `\n` (and a
/// preceding `\r`) is stripped; invalid UTF-8 is replaced.
fn for_each_line<R, F>(mut reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(u64, &str) -> Result<()>,
{
    let mut buf = Vec::new();
    let mut line_no = 0u64;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        line_no += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        f(line_no, &String::from_utf8_lossy(&buf))?;
    }
}
