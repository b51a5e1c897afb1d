//! LLM query generation
//!
//! Turns ground-truth failure records into benchmark queries: each record
//! gets a randomly chosen task type, a scoring rubric built from its ground
//! truth and an LLM-written instruction that hides that ground truth.
//! Records whose 30-minute window holds other failures become multi-answer
//! queries covering every failure in the window.

pub mod aggregate;
pub mod conflict;
pub mod generator;
pub mod instruction;
pub mod prompts;
pub mod record;
pub mod scoring;
pub mod stats;
pub mod task;
pub mod window;

pub use aggregate::MultiAnswerSet;
pub use conflict::ConflictFlags;
pub use generator::QueryGenerator;
pub use instruction::InstructionRequestor;
pub use record::{load_records, FailureRecord};
pub use stats::{DatasetStats, GeneratedQuery, GenerationReport, GenerationSummary, QueryTable};
pub use task::{TaskCatalog, TaskTemplate};
pub use window::{bucket_index, TimeBucketer, WINDOW_SECS};
