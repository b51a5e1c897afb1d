//! CLI subcommands

pub mod config;
pub mod dataset;
pub mod generate;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Print a report as pretty JSON on stdout, optionally saving a copy
pub fn emit_report<T: Serialize>(report: &T, report_file: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    if let Some(path) = report_file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }
    Ok(())
}
