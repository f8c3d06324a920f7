//! Measurement results.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Outcome frequencies keyed by classical bitstring.
///
/// Bitstrings follow the usual big-endian convention: the rightmost
/// character is classical bit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Frequency of `bitstring`; zero when it was never observed.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Outcomes sorted by bitstring.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Most frequent outcome, ties broken by the smaller bitstring.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.sorted()
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bitstring, count) in iter {
            counts.insert(bitstring, count);
        }
        counts
    }
}

/// Result of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub counts: Counts,
    pub shots: u32,
}

impl ExecutionResult {
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self { counts, shots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_outcome_is_zero() {
        let mut counts = Counts::new();
        counts.insert("1", 1024);
        assert_eq!(counts.get("1"), 1024);
        assert_eq!(counts.get("0"), 0);
        assert_eq!(counts.total_shots(), 1024);
    }

    #[test]
    fn test_insert_accumulates() {
        let counts: Counts = [("01".to_string(), 3), ("01".to_string(), 4), ("10".to_string(), 1)]
            .into_iter()
            .collect();
        assert_eq!(counts.get("01"), 7);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_most_frequent_tie_breaks_on_bitstring() {
        let counts: Counts = [("11".to_string(), 5), ("00".to_string(), 5), ("01".to_string(), 1)]
            .into_iter()
            .collect();
        assert_eq!(counts.most_frequent(), Some(("00", 5)));
        assert_eq!(Counts::new().most_frequent(), None);
    }
}
