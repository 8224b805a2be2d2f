use crate::rank::rank_order;
use std::collections::HashMap;
use tracing::debug;

/// Accumulated counts per key, bounded by periodic pruning.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
    prunes: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to `key`, starting from zero when absent.
    pub fn observe(&mut self, key: &str, amount: u64) {
        match self.counts.get_mut(key) {
            Some(count) => *count = count.saturating_add(amount),
            None => {
                self.counts.insert(key.to_owned(), amount);
            }
        }
    }

    /// Overwrites the count for `key`. Used for pre-tallied input.
    pub fn assign(&mut self, key: &str, value: u64) {
        self.counts.insert(key.to_owned(), value);
    }

    /// Keeps the `max_keys` highest-ranked entries and drops the rest.
    pub fn prune(&mut self, max_keys: usize) {
        let before = self.counts.len();
        if before > max_keys {
            let mut entries: Vec<(String, u64)> = self.counts.drain().collect();
            entries.sort_unstable_by(|a, b| rank_order(&a.0, a.1, &b.0, b.1));
            entries.truncate(max_keys);
            self.counts = entries.into_iter().collect();
        }
        self.prunes += 1;
        debug!(before, after = self.counts.len(), prunes = self.prunes, "pruned frequency table");
    }

    /// Sum of all current counts, recomputed on every call.
    pub fn total_value(&self) -> u64 {
        self.counts.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn prune_count(&self) -> u64 {
        self.prunes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.observe(&k, v);
        }
        table
    }
}
