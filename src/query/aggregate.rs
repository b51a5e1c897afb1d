//! Collection of co-located failures for multi-failure queries

use super::record::FailureRecord;
use super::window::{bucket_index, TimeBucketer};
use crate::error::Result;

/// Every failure sharing a window with a target timestamp, as parallel lists
/// in record order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiAnswerSet {
    pub datetime: Vec<String>,
    pub component: Vec<String>,
    pub reason: Vec<String>,
}

impl MultiAnswerSet {
    pub fn collect(
        target_timestamp: i64,
        records: &[FailureRecord],
        bucketer: &TimeBucketer,
    ) -> Result<Self> {
        let window = bucket_index(target_timestamp);
        let mut set = Self::default();
        for record in records
            .iter()
            .filter(|r| bucket_index(r.timestamp) == window)
        {
            set.datetime.push(bucketer.format_datetime(record.timestamp)?);
            set.component.push(record.component.clone());
            set.reason.push(record.reason.clone());
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }
}
