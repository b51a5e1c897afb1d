//! Query generation driver
//!
//! Walks each dataset's failure records in file order, picks a task type for
//! every record, synthesizes its scoring points and asks the LLM for the
//! instruction text. Records are processed one at a time; a record that
//! fails is logged into the dataset's stats and the scan moves on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{error, info, warn};

use super::aggregate::MultiAnswerSet;
use super::conflict::ConflictFlags;
use super::instruction::{build_prompt, input_specification, output_specification, InstructionRequestor};
use super::record::{load_records, FailureRecord};
use super::scoring::{multi_scoring_points, single_scoring_points, SingleAnswer};
use super::stats::{DatasetStats, GeneratedQuery, GenerationReport, QueryTable};
use super::task::TaskCatalog;
use super::window::TimeBucketer;
use crate::config::{DatasetSpec, GeneratorConfig};
use crate::error::Result;
use crate::llm::LlmClient;

pub struct QueryGenerator {
    client: Box<dyn LlmClient>,
    catalog: TaskCatalog,
    bucketer: TimeBucketer,
    config: GeneratorConfig,
}

impl QueryGenerator {
    pub fn new(
        client: Box<dyn LlmClient>,
        catalog: TaskCatalog,
        config: GeneratorConfig,
    ) -> Result<Self> {
        let bucketer = TimeBucketer::new(config.utc_offset_minutes)?;
        Ok(Self {
            client,
            catalog,
            bucketer,
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    /// Task-selection RNG seeded from the configured seed
    pub fn seeded_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.config.seed)
    }

    /// Generate one query per record.
    ///
    /// Only `InvalidInput` escapes; record-level failures are counted in the
    /// returned stats.
    pub async fn generate_for_records<R: Rng + ?Sized>(
        &self,
        dataset_name: &str,
        records: &[FailureRecord],
        extra_spec: Option<&str>,
        rng: &mut R,
    ) -> Result<(QueryTable, DatasetStats)> {
        let timestamps: Vec<i64> = records.iter().map(|r| r.timestamp).collect();
        let flags = ConflictFlags::detect(&timestamps);
        info!(
            "{}: {} records, {} in shared windows",
            dataset_name,
            records.len(),
            flags.conflicting_count()
        );

        let requestor = InstructionRequestor::new(
            self.client.as_ref(),
            self.config.temperature,
            self.config.max_attempts,
        );
        let mut stats = DatasetStats::new(dataset_name, records.len(), self.catalog.ids());
        let mut table = QueryTable::default();

        for (idx, record) in records.iter().enumerate() {
            let outcome = self
                .generate_record(record, records, &flags, extra_spec, &requestor, rng, &mut stats)
                .await;
            match outcome {
                Ok(row) => {
                    stats.queries_generated += 1;
                    table.push(row);
                }
                Err(e) if e.is_record_scoped() => {
                    warn!("Record {}: {}", idx, e);
                    stats.record_error(idx, &e);
                }
                Err(e) => return Err(e),
            }
        }

        stats.finish();
        Ok((table, stats))
    }

    #[allow(clippy::too_many_arguments)]
    async fn generate_record<R: Rng + ?Sized>(
        &self,
        record: &FailureRecord,
        records: &[FailureRecord],
        flags: &ConflictFlags,
        extra_spec: Option<&str>,
        requestor: &InstructionRequestor<'_>,
        rng: &mut R,
        stats: &mut DatasetStats,
    ) -> Result<GeneratedQuery> {
        let datetime = self.bucketer.format_datetime(record.timestamp)?;
        let time_period = self.bucketer.format_period(record.timestamp)?;

        let (task_id, task) = self.catalog.choose(rng);
        stats.count_task(task_id);

        let (num, scoring_points) = if flags.is_conflicting(record.timestamp) {
            let answers = MultiAnswerSet::collect(record.timestamp, records, &self.bucketer)?;
            stats.multi_failure_queries += 1;
            info!("Multi-response task with {} root causes", answers.len());
            (
                answers.len(),
                multi_scoring_points(&task.scoring_points, &answers)?,
            )
        } else {
            let answer = SingleAnswer {
                time_period: &time_period,
                datetime: &datetime,
                component: &record.component,
                reason: &record.reason,
            };
            (1, single_scoring_points(&task.scoring_points, &answer)?)
        };

        let input = input_specification(&task.input, num, &time_period, extra_spec)?;
        let output = output_specification(&task.output)?;
        let prompt = build_prompt(&input, &output)?;
        let instruction = requestor.request(&prompt).await?;

        Ok(GeneratedQuery {
            task_index: task_id.to_string(),
            instruction,
            scoring_points,
        })
    }

    /// Load a dataset's records, generate its queries and write the query
    /// table into `output_dir`
    pub async fn generate_for_dataset<R: Rng + ?Sized>(
        &self,
        spec: &DatasetSpec,
        dataset_root: &Path,
        output_dir: &Path,
        rng: &mut R,
    ) -> Result<DatasetStats> {
        let record_path = dataset_root.join(&spec.record_path);
        let records = load_records(&record_path)?;
        info!("Processing {} ({} records)", spec.name, records.len());

        let (table, mut stats) = self
            .generate_for_records(&spec.name, &records, spec.extra_spec.as_deref(), rng)
            .await?;

        let output_path = output_dir.join(spec.output_file_name());
        table.write(&output_path)?;
        stats.output_path = Some(output_path.display().to_string());
        Ok(stats)
    }

    /// Run every configured dataset in order.
    ///
    /// Datasets without a record file are skipped. A dataset that cannot be
    /// read is reported as failed and the run continues with the next one.
    pub async fn generate_all<R: Rng + ?Sized>(
        &self,
        dataset_root: &Path,
        output_dir: &Path,
        rng: &mut R,
    ) -> Result<GenerationReport> {
        std::fs::create_dir_all(output_dir)?;
        let mut report = GenerationReport::default();

        for spec in &self.config.datasets {
            let record_path = dataset_root.join(&spec.record_path);
            if !record_path.exists() {
                info!("Skipping {}: {} not found", spec.name, record_path.display());
                continue;
            }

            match self
                .generate_for_dataset(spec, dataset_root, output_dir, rng)
                .await
            {
                Ok(stats) => {
                    info!(
                        "{}: {} queries generated, {} errors ({})",
                        spec.name,
                        stats.queries_generated,
                        stats.generation_errors.len(),
                        stats.status
                    );
                    report.add(stats);
                }
                Err(e) => {
                    error!("Dataset {} failed: {}", spec.name, e);
                    report.add(DatasetStats::aborted(
                        &spec.name,
                        self.catalog.ids(),
                        e.to_string(),
                    ));
                }
            }
        }

        let summary = &report.generation_summary;
        info!(
            "Generation finished: {} queries, {} failed records, {} multi-failure queries",
            summary.total_queries, summary.failed_generations, summary.multi_failure_queries
        );
        Ok(report)
    }
}
