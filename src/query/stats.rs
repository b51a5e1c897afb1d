//! Generated query tables and generation statistics

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::status::RunStatus;
use crate::util::csv::write_row;

/// One row of a dataset's query table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuery {
    pub task_index: String,
    pub instruction: String,
    pub scoring_points: String,
}

/// Append-only query table, persisted once per dataset
#[derive(Debug, Clone, Default)]
pub struct QueryTable {
    rows: Vec<GeneratedQuery>,
}

impl QueryTable {
    pub fn push(&mut self, row: GeneratedQuery) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[GeneratedQuery] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        write_row(&mut csv, &["task_index", "instruction", "scoring_points"]);
        for row in &self.rows {
            write_row(
                &mut csv,
                &[&row.task_index, &row.instruction, &row.scoring_points],
            );
        }
        csv
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_csv())?;
        info!("Saved {} queries to {}", self.len(), path.display());
        Ok(())
    }
}

/// Counters for one dataset scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub dataset_name: String,
    pub total_records: usize,
    pub queries_generated: usize,
    pub multi_failure_queries: usize,
    pub task_distribution: IndexMap<String, usize>,
    pub generation_errors: Vec<String>,
    pub status: RunStatus,
    /// Set when the dataset could not be scanned at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl DatasetStats {
    pub fn new(dataset_name: &str, total_records: usize, task_ids: &[String]) -> Self {
        Self {
            dataset_name: dataset_name.to_string(),
            total_records,
            queries_generated: 0,
            multi_failure_queries: 0,
            task_distribution: task_ids.iter().map(|id| (id.clone(), 0)).collect(),
            generation_errors: Vec::new(),
            status: RunStatus::Success,
            error: None,
            output_path: None,
        }
    }

    /// Stats for a dataset whose scan aborted before producing anything
    pub fn aborted(dataset_name: &str, task_ids: &[String], error: String) -> Self {
        let mut stats = Self::new(dataset_name, 0, task_ids);
        stats.error = Some(error);
        stats.status = RunStatus::Failed;
        stats
    }

    pub fn count_task(&mut self, task_id: &str) {
        *self.task_distribution.entry(task_id.to_string()).or_default() += 1;
    }

    pub fn record_error(&mut self, record_idx: usize, error: impl std::fmt::Display) {
        self.generation_errors
            .push(format!("Record {}: {}", record_idx, error));
    }

    /// Freeze the status once the scan is over
    pub fn finish(&mut self) {
        self.status = if self.error.is_some() {
            RunStatus::Failed
        } else {
            RunStatus::from_counts(self.queries_generated, self.generation_errors.len())
        };
    }
}

/// Totals across every processed dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub total_queries: usize,
    pub successful_generations: usize,
    pub failed_generations: usize,
    pub task_distribution: IndexMap<String, usize>,
    pub datasets_processed: Vec<String>,
    pub datasets_failed: Vec<String>,
    pub multi_failure_queries: usize,
}

impl GenerationSummary {
    pub fn absorb(&mut self, stats: &DatasetStats) {
        self.datasets_processed.push(stats.dataset_name.clone());
        if stats.error.is_some() {
            self.datasets_failed.push(stats.dataset_name.clone());
        }
        self.total_queries += stats.queries_generated;
        self.successful_generations += stats.queries_generated;
        self.failed_generations += stats.generation_errors.len();
        self.multi_failure_queries += stats.multi_failure_queries;
        for (task, count) in &stats.task_distribution {
            *self.task_distribution.entry(task.clone()).or_default() += count;
        }
    }

    pub fn status(&self) -> RunStatus {
        RunStatus::from_counts(
            self.successful_generations,
            self.failed_generations + self.datasets_failed.len(),
        )
    }
}

/// The JSON generation report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation_summary: GenerationSummary,
    pub dataset_details: Vec<DatasetStats>,
}

impl GenerationReport {
    pub fn add(&mut self, stats: DatasetStats) {
        self.generation_summary.absorb(&stats);
        self.dataset_details.push(stats);
    }

    pub fn status(&self) -> RunStatus {
        self.generation_summary.status()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Generation report saved to {}", path.display());
        Ok(())
    }
}
