//! Partial-success reports for batch commits.

use serde::{Deserialize, Serialize};

use seal_core::SealCode;

use crate::error::RegistryError;

/// One seal that a batch could not commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub code: SealCode,
    /// Machine-readable kind, see [`RegistryError::kind`].
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

impl BatchFailure {
    pub fn new(code: SealCode, error: &RegistryError) -> Self {
        Self {
            code,
            kind: error.kind().to_string(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Outcome of a batch: committed seals are never rolled back when a later
/// seal fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<SealCode>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn record(&mut self, code: SealCode, outcome: Result<(), RegistryError>) {
        match outcome {
            Ok(()) => self.succeeded.push(code),
            Err(e) => self.failed.push(BatchFailure::new(code, &e)),
        }
    }

    /// Every seal committed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
