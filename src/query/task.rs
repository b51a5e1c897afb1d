//! Task templates
//!
//! A task specification maps task identifiers to the fields a query states
//! as known (`input`), asks the solver to find (`output`) and grades against
//! (`scoring_points`).

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{QueryError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub input: Vec<String>,
    pub output: Vec<String>,
    pub scoring_points: Vec<String>,
}

/// All task templates, in specification file order
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: IndexMap<String, TaskTemplate>,
    ids: Vec<String>,
}

impl TaskCatalog {
    pub fn new(tasks: IndexMap<String, TaskTemplate>) -> Result<Self> {
        if tasks.is_empty() {
            return Err(QueryError::InvalidInput(
                "task specification contains no tasks".to_string(),
            ));
        }
        let ids = tasks.keys().cloned().collect();
        Ok(Self { tasks, ids })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let tasks: IndexMap<String, TaskTemplate> = serde_json::from_str(text)
            .map_err(|e| QueryError::InvalidInput(format!("task specification: {}", e)))?;
        Self::new(tasks)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn get(&self, id: &str) -> Option<&TaskTemplate> {
        self.tasks.get(id)
    }

    /// Pick a task uniformly at random from `rng`
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> (&str, &TaskTemplate) {
        let id = self
            .ids
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_else(|| self.ids[0].as_str());
        (id, &self.tasks[id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SPEC: &str = r#"{
        "task_7": {"input": ["{time_period}"], "output": ["{reason}"], "scoring_points": ["{reason}"]},
        "task_1": {"input": ["{time_period}"], "output": ["{component}"], "scoring_points": ["{component}"]},
        "task_3": {"input": ["{num}"], "output": ["{datetime}"], "scoring_points": ["{datetime}"]}
    }"#;

    #[test]
    fn test_ids_keep_file_order() {
        let catalog = TaskCatalog::from_json(SPEC).unwrap();
        assert_eq!(catalog.ids(), &["task_7", "task_1", "task_3"]);
        assert_eq!(catalog.get("task_1").unwrap().output, vec!["{component}"]);
    }

    #[test]
    fn test_choose_is_deterministic_for_seed() {
        let catalog = TaskCatalog::from_json(SPEC).unwrap();
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| catalog.choose(&mut rng).0.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(42), pick(42));
        assert!(pick(42).iter().all(|id| catalog.get(id).is_some()));
    }

    #[test]
    fn test_empty_or_invalid_spec() {
        assert!(matches!(
            TaskCatalog::from_json("{}"),
            Err(QueryError::InvalidInput(_))
        ));
        assert!(matches!(
            TaskCatalog::from_json(r#"{"task_1": {"input": []}}"#),
            Err(QueryError::InvalidInput(_))
        ));
    }
}
