//! generate command

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use openrca_pipeline::{build_client, ApiConfig, GeneratorConfig, QueryGenerator, TaskCatalog};

use crate::style::*;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Root directory holding the datasets
    #[arg(short, long, env = "OPENRCA_DATASET_DIR")]
    pub dataset_dir: PathBuf,

    /// Validated API configuration (YAML)
    #[arg(short, long, env = "OPENRCA_API_CONFIG")]
    pub api_config: PathBuf,

    /// Task specification (JSON)
    #[arg(short, long, env = "OPENRCA_TASK_SPEC")]
    pub task_spec: PathBuf,

    /// Directory for the generated query tables
    #[arg(short, long, default_value = "queries", env = "OPENRCA_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Generation report path [default: <output-dir>/generation_report.json]
    #[arg(long)]
    pub report_file: Option<PathBuf>,

    /// Seed for task-type selection
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Wall-clock time zone as minutes east of UTC
    #[arg(long, default_value_t = 480, allow_hyphen_values = true)]
    pub utc_offset_minutes: i32,

    /// Sampling temperature [default: MODEL_PARAMETERS.temperature, else 1.0]
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Attempts per record before giving up
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Only process these datasets (repeatable)
    #[arg(long = "dataset")]
    pub datasets: Vec<String>,
}

pub async fn run(args: GenerateArgs) -> Result<i32> {
    print_header("Query Generation");

    let api_config = ApiConfig::load(&args.api_config)?;
    let client = build_client(&api_config).context("Failed to create LLM client")?;
    let catalog = TaskCatalog::load(&args.task_spec)
        .with_context(|| format!("Failed to load task spec {}", args.task_spec.display()))?;

    let mut config = GeneratorConfig {
        seed: args.seed,
        utc_offset_minutes: args.utc_offset_minutes,
        temperature: args
            .temperature
            .or(api_config.model_parameters.temperature)
            .unwrap_or(1.0),
        max_attempts: args.max_attempts,
        ..GeneratorConfig::default()
    };
    if !args.datasets.is_empty() {
        config.datasets.retain(|d| args.datasets.contains(&d.name));
    }

    print_key_value("Provider", &api_config.source);
    print_key_value("Model", client.model());
    print_key_value("Tasks", &catalog.ids().join(", "));
    print_key_value("Seed", &config.seed.to_string());
    print_key_value("Output", &args.output_dir.display().to_string());

    let generator = QueryGenerator::new(client, catalog, config)?;
    let mut rng = generator.seeded_rng();
    let report = generator
        .generate_all(&args.dataset_dir, &args.output_dir, &mut rng)
        .await?;

    let report_path = args
        .report_file
        .unwrap_or_else(|| args.output_dir.join("generation_report.json"));
    report.write(&report_path)?;

    let summary = &report.generation_summary;
    print_section("Summary");
    print_key_value("Datasets", &summary.datasets_processed.join(", "));
    print_key_value("Queries", &summary.total_queries.to_string());
    print_key_value("Failed records", &summary.failed_generations.to_string());
    print_key_value(
        "Multi-failure queries",
        &summary.multi_failure_queries.to_string(),
    );
    print_info(&format!("Report saved to {}", report_path.display()));

    let errors: Vec<String> = report
        .dataset_details
        .iter()
        .flat_map(|d| d.error.iter().chain(d.generation_errors.iter()).cloned())
        .collect();
    print_messages(&errors, &[]);

    print_status(report.status());
    Ok(report.status().exit_code())
}
