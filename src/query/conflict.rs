//! Detection of failures sharing a 30-minute window

use std::collections::{BTreeMap, HashMap};

use super::window::bucket_index;

/// Per-timestamp multi-failure flags for one dataset
///
/// A timestamp is flagged when its window holds two or more records. Every
/// member of such a window is flagged, including the earliest one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictFlags {
    flags: BTreeMap<i64, bool>,
}

impl ConflictFlags {
    /// Build flags for every timestamp of a dataset. Duplicates count as
    /// separate records.
    pub fn detect(timestamps: &[i64]) -> Self {
        let mut sorted = timestamps.to_vec();
        sorted.sort_unstable();

        let mut window_counts: HashMap<i64, usize> = HashMap::new();
        for &ts in &sorted {
            *window_counts.entry(bucket_index(ts)).or_default() += 1;
        }

        let flags = sorted
            .iter()
            .map(|&ts| (ts, window_counts[&bucket_index(ts)] >= 2))
            .collect();

        Self { flags }
    }

    /// Flag for a timestamp, `None` if it was not part of the dataset
    pub fn get(&self, timestamp: i64) -> Option<bool> {
        self.flags.get(&timestamp).copied()
    }

    pub fn is_conflicting(&self, timestamp: i64) -> bool {
        self.get(timestamp).unwrap_or(false)
    }

    /// Number of distinct timestamps covered
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn conflicting_count(&self) -> usize {
        self.flags.values().filter(|&&f| f).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, bool)> + '_ {
        self.flags.iter().map(|(&ts, &f)| (ts, f))
    }
}
