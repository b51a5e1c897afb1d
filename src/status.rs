//! Outcome of a pipeline stage and its process exit code

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

impl RunStatus {
    /// Success when nothing failed, partial when something also succeeded
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        if failed == 0 {
            RunStatus::Success
        } else if succeeded > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Partial => 2,
            RunStatus::Failed => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
