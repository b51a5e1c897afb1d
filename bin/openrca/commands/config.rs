//! validate-config command

use anyhow::Result;
use std::path::Path;

use openrca_pipeline::validation::validate_and_write;
use openrca_pipeline::RunStatus;

use super::emit_report;
use crate::style::*;

pub fn run(template: &Path, output: &Path) -> Result<i32> {
    print_header("API Configuration");
    print_key_value("Template", &template.display().to_string());
    print_key_value("Output", &output.display().to_string());

    let report = validate_and_write(template, output);

    if let Some(provider) = &report.provider {
        print_key_value("Provider", provider);
    }
    if let Some(model) = &report.model {
        print_key_value("Model", model);
    }
    if let Some(caps) = &report.capabilities {
        print_key_value("Context length", &caps.context_length.to_string());
    }
    print_messages(&report.errors, &report.warnings);

    emit_report(&report, None)?;
    let code = report.exit_code();
    print_status(if code == 0 {
        RunStatus::Success
    } else {
        RunStatus::Failed
    });
    Ok(code)
}
