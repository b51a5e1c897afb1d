//! validate-dataset command

use anyhow::Result;
use std::path::Path;

use openrca_pipeline::validation::dataset::DatasetState;
use openrca_pipeline::validation::{DatasetValidator, SourcesManifest};

use super::emit_report;
use crate::style::*;

pub fn run(dataset_dir: &Path, sources: &Path, report_file: Option<&Path>) -> Result<i32> {
    print_header("Dataset Validation");
    print_key_value("Dataset root", &dataset_dir.display().to_string());
    print_key_value("Manifest", &sources.display().to_string());

    let manifest = SourcesManifest::load(sources)?;
    let report = DatasetValidator::new(dataset_dir, manifest).validate_all();

    print_section("Datasets");
    for (name, dataset) in &report.datasets {
        let icon = match dataset.status {
            DatasetState::Valid => icon_success(),
            DatasetState::Partial => icon_warning(),
            DatasetState::Invalid | DatasetState::Missing => icon_error(),
        };
        eprintln!(
            "    {} {} ({} files, {:.1} MB)",
            icon, name, dataset.statistics.file_count, dataset.statistics.total_size_mb
        );
    }
    print_messages(&report.errors, &report.warnings);

    emit_report(&report, report_file)?;
    print_status(report.validation_status);
    Ok(report.exit_code())
}
