//! Append-only record of one search run.

use serde::{Deserialize, Serialize};

use super::Score;

/// What happened in one generate → evaluate → select step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    /// Frontier entering the step.
    pub ys: Vec<String>,
    /// Flat expanded set, frontier order preserved.
    pub new_ys: Vec<String>,
    /// One score per entry of `new_ys`.
    pub values: Vec<Score>,
    /// Indices into `new_ys` chosen by the selector.
    pub select_ids: Vec<usize>,
    /// Frontier leaving the step.
    pub select_new_ys: Vec<String>,
}

/// Step records in order. Records are only appended, and only for completed steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    steps: Vec<StepRecord>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&StepRecord> {
        self.steps.last()
    }
}
