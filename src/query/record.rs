//! Ground-truth failure records

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{QueryError, Result};
use crate::util::csv::CsvTable;

/// One observed failure from a dataset's `record.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    pub component: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn new(timestamp: i64, component: &str, reason: &str) -> Self {
        Self {
            timestamp,
            component: component.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Load records in file order. Any malformed row rejects the whole file.
pub fn load_records(path: &Path) -> Result<Vec<FailureRecord>> {
    let table = CsvTable::read_path(path)
        .map_err(|e| QueryError::InvalidInput(format!("{}: {}", path.display(), e)))?;
    records_from_table(&table)
}

pub fn records_from_table(table: &CsvTable) -> Result<Vec<FailureRecord>> {
    let column = |name: &str| {
        table
            .column(name)
            .ok_or_else(|| QueryError::InvalidInput(format!("missing column '{}'", name)))
    };
    let ts_col = column("timestamp")?;
    let component_col = column("component")?;
    let reason_col = column("reason")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let raw = row[ts_col].trim();
            let timestamp = raw.parse::<i64>().map_err(|_| {
                QueryError::InvalidInput(format!("row {}: invalid timestamp '{}'", idx, raw))
            })?;
            if chrono::DateTime::from_timestamp(timestamp, 0).is_none() {
                return Err(QueryError::InvalidInput(format!(
                    "row {}: timestamp out of range: {}",
                    idx, timestamp
                )));
            }
            Ok(FailureRecord {
                timestamp,
                component: row[component_col].clone(),
                reason: row[reason_col].clone(),
            })
        })
        .collect()
}
