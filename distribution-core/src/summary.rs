use crate::tokenizer::IngestStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub examined: u64,
    pub matched: u64,
    pub distinct: usize,
    pub prunes: u64,
    pub elapsed_ms: f64,
}

impl RunSummary {
    pub fn new(stats: &IngestStats, distinct: usize, elapsed: Duration) -> Self {
        Self {
            examined: stats.examined,
            matched: stats.matched,
            distinct,
            prunes: stats.prunes,
            elapsed_ms: elapsed.as_nanos() as f64 / 1e6,
        }
    }

    /// The verbose block written to the diagnostic stream.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("tokens/lines examined: {}", commafy(self.examined)),
            format!(" tokens/lines matched: {}", commafy(self.matched)),
            format!("       histogram keys: {}", commafy(self.distinct as u64)),
            format!("          hash prunes: {}", commafy(self.prunes)),
            format!("              runtime: {}ms", commafy_f64(self.elapsed_ms)),
        ]
    }
}

/// In-place progress line, overwritten by the next one.
pub fn progress_line(stats: &IngestStats) -> String {
    format!(
        "tokens/lines examined: {} ; hash prunes: {}...\r",
        commafy(stats.examined),
        commafy(stats.prunes)
    )
}

/// `1234567` -> `1,234,567`
pub fn commafy(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Thousands separators on the integer part, shortest decimal form after.
pub fn commafy_f64(v: f64) -> String {
    let text = v.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let int = int_part.parse::<u64>().map(commafy).unwrap_or_else(|_| int_part.to_owned());
    match frac {
        Some(f) => format!("{sign}{int}.{f}"),
        None => format!("{sign}{int}"),
    }
}
