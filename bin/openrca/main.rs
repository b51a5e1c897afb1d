//! OpenRCA pipeline CLI
//!
//! Runs the dataset validation, API config validation and query generation
//! stages. Each stage prints its JSON report on stdout and exits with `0` on
//! success, `2` on partial success and `1` on failure.

mod commands;
mod style;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::generate::GenerateArgs;
use style::print_error;

#[derive(Parser, Debug)]
#[command(name = "openrca")]
#[command(about = "OpenRCA benchmark preparation pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a dataset tree against its sources manifest
    ValidateDataset {
        /// Root directory holding the datasets
        #[arg(short, long, env = "OPENRCA_DATASET_DIR")]
        dataset_dir: std::path::PathBuf,

        /// sources.json with the expected structure
        #[arg(short, long, env = "OPENRCA_SOURCES")]
        sources: std::path::PathBuf,

        /// Also write the report to this file
        #[arg(long)]
        report_file: Option<std::path::PathBuf>,
    },

    /// Check an API configuration template and write the validated copy
    ValidateConfig {
        /// Configuration template (YAML)
        #[arg(short, long, env = "OPENRCA_API_CONFIG_TEMPLATE")]
        template: std::path::PathBuf,

        /// Where to write the env-substituted configuration
        #[arg(short, long, env = "OPENRCA_API_CONFIG")]
        output: std::path::PathBuf,
    },

    /// Generate benchmark queries from ground-truth records
    Generate(GenerateArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("openrca_pipeline=debug,info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::ValidateDataset {
            dataset_dir,
            sources,
            report_file,
        } => commands::dataset::run(&dataset_dir, &sources, report_file.as_deref()),
        Commands::ValidateConfig { template, output } => commands::config::run(&template, &output),
        Commands::Generate(args) => commands::generate::run(args).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{:#}", e));
            1
        }
    };
    std::process::exit(code);
}
