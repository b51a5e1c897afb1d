//! Dataset Validator - Checks a downloaded OpenRCA dataset tree
//!
//! Validates, per dataset:
//! - Required files exist and parse as CSV
//! - `record.csv` timestamps (unit, range) and ground-truth cardinalities
//! - Telemetry layout `telemetry/<date>/<type>/*.csv`
//! - Size and file counts of the dataset directory

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::status::RunStatus;
use crate::util::csv::CsvTable;

/// Timestamps above this are taken to be milliseconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// Expected layout of one dataset directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetLayout {
    pub files: Vec<String>,
    #[serde(default)]
    pub telemetry_dates: Vec<String>,
    #[serde(default)]
    pub telemetry_types: Vec<String>,
}

/// A top-level entry of the expected structure: either a dataset, or a
/// group of sub-datasets validated as `<group>/<sub>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructureEntry {
    Dataset(DatasetLayout),
    Group(IndexMap<String, DatasetLayout>),
}

/// The `sources.json` manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesManifest {
    pub expected_structure: IndexMap<String, StructureEntry>,
}

impl SourcesManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sources manifest {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse sources manifest {}", path.display()))
    }

    /// Every dataset to validate, groups flattened, in manifest order
    pub fn datasets(&self) -> Vec<(String, &DatasetLayout)> {
        let mut out = Vec::new();
        for (name, entry) in &self.expected_structure {
            match entry {
                StructureEntry::Dataset(layout) => out.push((name.clone(), layout)),
                StructureEntry::Group(subs) => {
                    for (sub, layout) in subs {
                        out.push((format!("{}/{}", name, sub), layout));
                    }
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetState {
    Valid,
    Partial,
    Invalid,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Valid,
    Error,
    MissingColumn,
}

/// Timestamp column summary of a `record.csv`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampValidation {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_records: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TimestampValidation {
    fn with_status(status: CheckStatus) -> Self {
        Self {
            status,
            unit: None,
            min_timestamp: None,
            max_timestamp: None,
            range_days: None,
            total_records: None,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::with_status(CheckStatus::Error)
        }
    }
}

/// Schema summary of one required CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvSchema {
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_validation: Option<TimestampValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_components: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_reasons: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_tasks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryState {
    Valid,
    Partial,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryTypeCheck {
    /// `found` or `missing`
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryValidation {
    pub status: TelemetryState,
    pub dates_found: Vec<String>,
    pub dates_missing: Vec<String>,
    /// date -> telemetry type -> check
    pub type_validation: IndexMap<String, IndexMap<String, TelemetryTypeCheck>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryStatistics {
    pub total_size_mb: f64,
    pub file_count: usize,
    pub csv_file_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetValidation {
    pub status: DatasetState,
    pub path: String,
    pub files_found: Vec<String>,
    pub files_missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry_validation: Option<TelemetryValidation>,
    pub schema_validation: IndexMap<String, CsvSchema>,
    pub statistics: DirectoryStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationTotals {
    pub datasets_checked: usize,
    pub datasets_valid: usize,
    pub total_size_mb: f64,
    pub file_count: usize,
}

/// Result of validating every dataset in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetValidationReport {
    pub validation_status: RunStatus,
    pub datasets: IndexMap<String, DatasetValidation>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub statistics: ValidationTotals,
}

impl DatasetValidationReport {
    pub fn exit_code(&self) -> i32 {
        self.validation_status.exit_code()
    }
}

pub struct DatasetValidator {
    base_path: PathBuf,
    manifest: SourcesManifest,
}

impl DatasetValidator {
    pub fn new(base_path: impl Into<PathBuf>, manifest: SourcesManifest) -> Self {
        Self {
            base_path: base_path.into(),
            manifest,
        }
    }

    pub fn validate_all(&self) -> DatasetValidationReport {
        info!("Validating datasets under {}", self.base_path.display());
        let mut datasets = IndexMap::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (name, layout) in self.manifest.datasets() {
            let result = self.validate_dataset(&name, layout);
            if let Some(error) = &result.error {
                errors.push(error.clone());
            }
            for file in &result.files_missing {
                warnings.push(format!("{}: missing {}", name, file));
            }
            info!("{}: {:?}", name, result.status);
            datasets.insert(name, result);
        }

        let statuses: Vec<DatasetState> = datasets.values().map(|d| d.status).collect();
        let validation_status = if statuses.iter().all(|s| *s == DatasetState::Valid) {
            RunStatus::Success
        } else if statuses.iter().any(|s| *s == DatasetState::Valid) {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };

        let statistics = ValidationTotals {
            datasets_checked: datasets.len(),
            datasets_valid: statuses.iter().filter(|s| **s == DatasetState::Valid).count(),
            total_size_mb: datasets.values().map(|d| d.statistics.total_size_mb).sum(),
            file_count: datasets.values().map(|d| d.statistics.file_count).sum(),
        };

        DatasetValidationReport {
            validation_status,
            datasets,
            errors,
            warnings,
            statistics,
        }
    }

    pub fn validate_dataset(&self, name: &str, layout: &DatasetLayout) -> DatasetValidation {
        let dataset_path = self.base_path.join(name);
        debug!("Validating dataset {} at {}", name, dataset_path.display());

        let mut result = DatasetValidation {
            status: DatasetState::Invalid,
            path: dataset_path.display().to_string(),
            files_found: Vec::new(),
            files_missing: Vec::new(),
            telemetry_validation: None,
            schema_validation: IndexMap::new(),
            statistics: DirectoryStatistics::default(),
            error: None,
        };

        if !dataset_path.exists() {
            warn!("Dataset directory not found: {}", dataset_path.display());
            result.status = DatasetState::Missing;
            result.error = Some(format!(
                "Dataset directory not found: {}",
                dataset_path.display()
            ));
            return result;
        }

        for file in &layout.files {
            let file_path = dataset_path.join(file);
            if file_path.exists() {
                result.files_found.push(file.clone());
                result
                    .schema_validation
                    .insert(file.clone(), validate_csv_schema(&file_path, file));
            } else {
                result.files_missing.push(file.clone());
            }
        }

        let telemetry_path = dataset_path.join("telemetry");
        let telemetry = if telemetry_path.exists() {
            validate_telemetry(&telemetry_path, &layout.telemetry_dates, &layout.telemetry_types)
        } else {
            TelemetryValidation {
                status: TelemetryState::Missing,
                dates_found: Vec::new(),
                dates_missing: layout.telemetry_dates.clone(),
                type_validation: IndexMap::new(),
                error: Some("Telemetry directory not found".to_string()),
            }
        };

        result.status = if result.files_missing.is_empty()
            && telemetry.status == TelemetryState::Valid
        {
            DatasetState::Valid
        } else if !result.files_found.is_empty() {
            DatasetState::Partial
        } else {
            DatasetState::Invalid
        };
        result.telemetry_validation = Some(telemetry);
        result.statistics = directory_statistics(&dataset_path);
        result
    }
}

pub fn validate_csv_schema(path: &Path, file_name: &str) -> CsvSchema {
    let table = match CsvTable::read_path(path) {
        Ok(table) => table,
        Err(e) => {
            return CsvSchema {
                status: CheckStatus::Error,
                rows: None,
                columns: None,
                timestamp_validation: None,
                unique_components: None,
                unique_reasons: None,
                unique_tasks: None,
                error: Some(e.to_string()),
            }
        }
    };

    let mut schema = CsvSchema {
        status: CheckStatus::Valid,
        rows: Some(table.rows.len()),
        columns: Some(table.headers.clone()),
        timestamp_validation: None,
        unique_components: None,
        unique_reasons: None,
        unique_tasks: None,
        error: None,
    };

    match file_name {
        "record.csv" => {
            schema.timestamp_validation = Some(validate_timestamps(&table, "timestamp"));
            schema.unique_components = Some(unique_count(&table, "component"));
            schema.unique_reasons = Some(unique_count(&table, "reason"));
        }
        "query.csv" => {
            schema.unique_tasks = Some(unique_count(&table, "task_index"));
        }
        _ => {}
    }
    schema
}

fn unique_count(table: &CsvTable, column: &str) -> usize {
    table
        .column_values(column)
        .map(|values| values.into_iter().collect::<HashSet<_>>().len())
        .unwrap_or(0)
}

/// Detect the timestamp unit and report the covered range in UTC
pub fn validate_timestamps(table: &CsvTable, column: &str) -> TimestampValidation {
    let Some(values) = table.column_values(column) else {
        return TimestampValidation::with_status(CheckStatus::MissingColumn);
    };

    let mut parsed = Vec::with_capacity(values.len());
    for raw in &values {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => parsed.push(v),
            _ => {
                return TimestampValidation::failed(format!(
                    "Unable to parse string \"{}\" as a number",
                    raw
                ))
            }
        }
    }
    if parsed.is_empty() {
        return TimestampValidation::failed("No timestamps".to_string());
    }

    let min = parsed.iter().copied().fold(f64::INFINITY, f64::min);
    let max = parsed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (unit, scale) = if min > MILLIS_THRESHOLD {
        ("milliseconds", 1.0)
    } else {
        ("seconds", 1000.0)
    };

    let to_utc = |v: f64| -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((v * scale).round() as i64)
    };
    let (Some(min_dt), Some(max_dt)) = (to_utc(min), to_utc(max)) else {
        return TimestampValidation::failed(format!(
            "Timestamps out of range: {} to {}",
            min, max
        ));
    };

    TimestampValidation {
        status: CheckStatus::Valid,
        unit: Some(unit.to_string()),
        min_timestamp: Some(min_dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        max_timestamp: Some(max_dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        range_days: Some((max_dt - min_dt).num_days()),
        total_records: Some(parsed.len()),
        error: None,
    }
}

pub fn validate_telemetry(
    telemetry_path: &Path,
    dates: &[String],
    types: &[String],
) -> TelemetryValidation {
    let mut result = TelemetryValidation {
        status: TelemetryState::Missing,
        dates_found: Vec::new(),
        dates_missing: Vec::new(),
        type_validation: IndexMap::new(),
        error: None,
    };

    for date in dates {
        let date_path = telemetry_path.join(date);
        if !date_path.exists() {
            result.dates_missing.push(date.clone());
            continue;
        }
        result.dates_found.push(date.clone());

        let checks = result.type_validation.entry(date.clone()).or_default();
        for kind in types {
            let type_path = date_path.join(kind);
            let check = if type_path.is_dir() {
                let files = csv_file_names(&type_path);
                TelemetryTypeCheck {
                    status: "found".to_string(),
                    file_count: Some(files.len()),
                    files: Some(files),
                }
            } else {
                TelemetryTypeCheck {
                    status: "missing".to_string(),
                    file_count: None,
                    files: None,
                }
            };
            checks.insert(kind.clone(), check);
        }
    }

    result.status = if !result.dates_found.is_empty() && result.dates_missing.is_empty() {
        TelemetryState::Valid
    } else if !result.dates_found.is_empty() {
        TelemetryState::Partial
    } else {
        TelemetryState::Missing
    };
    result
}

/// Names of the `.csv` files directly inside `dir`, sorted
fn csv_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

pub fn directory_statistics(dir: &Path) -> DirectoryStatistics {
    let mut stats = DirectoryStatistics::default();
    let mut total_bytes: u64 = 0;

    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                stats.error = Some(e.to_string());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        stats.file_count += 1;
        total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        if entry.path().extension().is_some_and(|ext| ext == "csv") {
            stats.csv_file_count += 1;
        }
    }

    stats.total_size_mb = total_bytes as f64 / 1024.0 / 1024.0;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "version": "1.0",
        "expected_structure": {
            "Bank": {
                "files": ["record.csv", "query.csv"],
                "telemetry_dates": ["2021_03_04"],
                "telemetry_types": ["metric", "trace", "log"]
            },
            "Market": {
                "cloudbed-1": {
                    "files": ["record.csv"],
                    "telemetry_dates": ["2022_03_20", "2022_03_21"],
                    "telemetry_types": ["metric"]
                },
                "cloudbed-2": {
                    "files": ["record.csv"],
                    "telemetry_dates": ["2022_03_20"],
                    "telemetry_types": ["metric"]
                }
            }
        }
    }"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn bank_tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Bank/record.csv",
            "timestamp,component,reason\n\
             1614841200,apache01,CPU fault\n\
             1615100400,apache01,network delay\n\
             1615014000,Mysql02,CPU fault\n",
        );
        write(
            dir.path(),
            "Bank/query.csv",
            "task_index,instruction,scoring_points\ntask_1,a,b\ntask_2,c,d\ntask_1,e,f\n",
        );
        write(dir.path(), "Bank/telemetry/2021_03_04/metric/metric_app.csv", "a\n1\n");
        write(dir.path(), "Bank/telemetry/2021_03_04/metric/metric_container.csv", "a\n1\n");
        write(dir.path(), "Bank/telemetry/2021_03_04/trace/trace_span.csv", "a\n1\n");
        write(dir.path(), "Bank/telemetry/2021_03_04/trace/README.txt", "not csv");
        dir
    }

    #[test]
    fn test_manifest_flattens_groups() {
        let manifest: SourcesManifest = serde_json::from_str(MANIFEST).unwrap();
        let names: Vec<String> = manifest.datasets().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Bank", "Market/cloudbed-1", "Market/cloudbed-2"]);
    }

    #[test]
    fn test_record_schema() {
        let dir = bank_tree();
        let schema = validate_csv_schema(&dir.path().join("Bank/record.csv"), "record.csv");
        assert_eq!(schema.status, CheckStatus::Valid);
        assert_eq!(schema.rows, Some(3));
        assert_eq!(schema.unique_components, Some(2));
        assert_eq!(schema.unique_reasons, Some(2));

        let ts = schema.timestamp_validation.unwrap();
        assert_eq!(ts.status, CheckStatus::Valid);
        assert_eq!(ts.unit.as_deref(), Some("seconds"));
        assert_eq!(ts.min_timestamp.as_deref(), Some("2021-03-04T07:00:00Z"));
        assert_eq!(ts.max_timestamp.as_deref(), Some("2021-03-07T07:00:00Z"));
        assert_eq!(ts.range_days, Some(3));
        assert_eq!(ts.total_records, Some(3));
    }

    #[test]
    fn test_millisecond_timestamps() {
        let table = CsvTable::parse("timestamp\n1614841200000\n1614841260000\n").unwrap();
        let ts = validate_timestamps(&table, "timestamp");
        assert_eq!(ts.unit.as_deref(), Some("milliseconds"));
        assert_eq!(ts.min_timestamp.as_deref(), Some("2021-03-04T07:00:00Z"));
        assert_eq!(ts.range_days, Some(0));
    }

    #[test]
    fn test_timestamp_problems() {
        let table = CsvTable::parse("time,component\n1,a\n").unwrap();
        assert_eq!(
            validate_timestamps(&table, "timestamp").status,
            CheckStatus::MissingColumn
        );

        let table = CsvTable::parse("timestamp\n1614841200\nsoon\n").unwrap();
        let ts = validate_timestamps(&table, "timestamp");
        assert_eq!(ts.status, CheckStatus::Error);
        assert!(ts.error.unwrap().contains("soon"));
    }

    #[test]
    fn test_query_schema_counts_tasks() {
        let dir = bank_tree();
        let schema = validate_csv_schema(&dir.path().join("Bank/query.csv"), "query.csv");
        assert_eq!(schema.unique_tasks, Some(2));
        assert!(schema.timestamp_validation.is_none());
    }

    #[test]
    fn test_telemetry_layout() {
        let dir = bank_tree();
        let telemetry = validate_telemetry(
            &dir.path().join("Bank/telemetry"),
            &["2021_03_04".to_string(), "2021_03_05".to_string()],
            &["metric".to_string(), "trace".to_string(), "log".to_string()],
        );
        assert_eq!(telemetry.status, TelemetryState::Partial);
        assert_eq!(telemetry.dates_missing, vec!["2021_03_05"]);

        let day = &telemetry.type_validation["2021_03_04"];
        assert_eq!(day["metric"].file_count, Some(2));
        assert_eq!(
            day["metric"].files.as_deref().unwrap(),
            ["metric_app.csv", "metric_container.csv"]
        );
        assert_eq!(day["trace"].file_count, Some(1));
        assert_eq!(day["log"].status, "missing");
    }

    #[test]
    fn test_validate_all() {
        let dir = bank_tree();
        write(dir.path(), "Market/cloudbed-1/record.csv", "timestamp,component,reason\n");
        write(dir.path(), "Market/cloudbed-1/telemetry/2022_03_20/metric/m.csv", "a\n");

        let manifest: SourcesManifest = serde_json::from_str(MANIFEST).unwrap();
        let report = DatasetValidator::new(dir.path(), manifest).validate_all();

        assert_eq!(report.datasets["Bank"].status, DatasetState::Valid);
        assert_eq!(report.datasets["Market/cloudbed-1"].status, DatasetState::Partial);
        assert_eq!(report.datasets["Market/cloudbed-2"].status, DatasetState::Missing);
        assert_eq!(report.validation_status, RunStatus::Partial);
        assert_eq!(report.exit_code(), 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("cloudbed-2"));

        let bank = &report.datasets["Bank"];
        assert_eq!(bank.statistics.file_count, 6);
        assert_eq!(bank.statistics.csv_file_count, 5);
        assert_eq!(report.statistics.datasets_checked, 3);
        assert_eq!(report.statistics.datasets_valid, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["validation_status"], "partial");
        assert_eq!(json["datasets"]["Market/cloudbed-2"]["status"], "missing");
    }

    #[test]
    fn test_missing_everything_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Bank")).unwrap();
        let manifest: SourcesManifest = serde_json::from_str(
            r#"{"expected_structure": {"Bank": {"files": ["record.csv"]}}}"#,
        )
        .unwrap();
        let report = DatasetValidator::new(dir.path(), manifest).validate_all();
        assert_eq!(report.datasets["Bank"].status, DatasetState::Invalid);
        assert_eq!(report.validation_status, RunStatus::Failed);
        assert_eq!(report.exit_code(), 1);
    }
}
