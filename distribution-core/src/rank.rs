use crate::table::FrequencyTable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Count descending, then key ascending. Shared by ranking and pruning.
pub fn rank_order(a_key: &str, a_count: u64, b_key: &str, b_count: u64) -> Ordering {
    b_count.cmp(&a_count).then_with(|| a_key.cmp(b_key))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ranking {
    pub entries: Vec<RankedEntry>,
    /// Sum over every entry, not just the displayed prefix.
    pub total: u64,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        count as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

pub fn rank(table: &FrequencyTable) -> Ranking {
    let total = table.total_value();
    let mut pairs: Vec<(&str, u64)> = table.iter().collect();
    pairs.sort_unstable_by(|a, b| rank_order(a.0, a.1, b.0, b.1));
    let entries = pairs
        .into_iter()
        .map(|(k, c)| RankedEntry {
            key: k.to_owned(),
            count: c,
            percentage: percentage(c, total),
        })
        .collect();
    Ranking { entries, total }
}
