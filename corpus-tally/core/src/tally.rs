//! Categorical tallies and their merge.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::RecordFields;

/// Occurrence counts per category value.
///
/// Merging is pointwise addition: associative, commutative, with the
/// empty tally as identity. Merge order never affects the counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalTally {
    counts: HashMap<String, u64>,
}

impl CategoricalTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `value`.
    pub fn record(&mut self, value: impl Into<String>) {
        *self.counts.entry(value.into()).or_insert(0) += 1;
    }

    /// Pointwise sum of `other` into `self`.
    pub fn merge(&mut self, other: CategoricalTally) {
        for (value, count) in other.counts {
            *self.counts.entry(value).or_insert(0) += count;
        }
    }

    pub fn count(&self, value: &str) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `k` most frequent values: higher count first, ties broken by
    /// ascending value so the ranking does not depend on merge order.
    pub fn top(&self, k: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|(value, count)| (value.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(k);
        entries
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for CategoricalTally {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self {
            counts: iter
                .into_iter()
                .map(|(value, count)| (value.into(), count))
                .collect(),
        }
    }
}

/// Everything one worker reports back after draining its share of the
/// corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankResult {
    pub rank: usize,
    /// Lines that decoded and were tallied.
    pub processed: usize,
    /// Malformed lines this worker consumed and dropped.
    pub skipped: usize,
    pub languages: CategoricalTally,
    pub hashtags: CategoricalTally,
}

impl RankResult {
    pub fn new(rank: usize) -> Self {
        Self {
            rank,
            ..Default::default()
        }
    }

    /// Lines this worker consumed, whether or not they decoded.
    pub fn consumed(&self) -> usize {
        self.processed + self.skipped
    }

    /// Tally the fields of one decoded record.
    pub fn absorb(&mut self, fields: RecordFields) {
        self.languages.record(fields.language);
        for tag in fields.hashtags {
            self.hashtags.record(tag);
        }
        self.processed += 1;
    }
}

/// Pointwise merge of every worker's tallies.
#[derive(Debug, Clone, Default)]
pub struct MergedTallies {
    pub processed: usize,
    pub skipped: usize,
    pub languages: CategoricalTally,
    pub hashtags: CategoricalTally,
}

impl MergedTallies {
    pub fn consumed(&self) -> usize {
        self.processed + self.skipped
    }
}

/// Merge per-worker results into the global tallies.
pub fn merge_results(results: impl IntoIterator<Item = RankResult>) -> MergedTallies {
    let mut merged = MergedTallies::default();
    for result in results {
        merged.processed += result.processed;
        merged.skipped += result.skipped;
        merged.languages.merge(result.languages);
        merged.hashtags.merge(result.hashtags);
    }
    merged
}
