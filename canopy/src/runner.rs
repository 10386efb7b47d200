//! Batch runner: search (or the naive baseline) over a range of task inputs with scoring.
//!
//! For each index the final candidates are judged by [`Task::test_output`]; the report keeps
//! per-index records plus two accuracies: mean-of-means (`accuracy_avg`) and the fraction of
//! indices with at least one correct candidate (`accuracy_any`).

use std::ops::Range;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, SearchConfig};
use crate::llm::{LlmBackend, LlmUsage};
use crate::search::{naive_solve, SearchError, Searcher, SolveError, Trace};
use crate::task::{Task, TaskError, TestOutcome};

/// Error from [`run`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("task index {index}: {source}")]
    Solve {
        index: usize,
        #[source]
        source: SolveError,
    },
    #[error("task index {index}: {source}")]
    Naive {
        index: usize,
        #[source]
        source: SearchError,
    },
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Options for one batch.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub indices: Range<usize>,
    /// Run the one-shot baseline instead of the search loop.
    pub naive: bool,
}

/// Token usage and estimated cost at some point of a batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UsageReport {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost: Option<f64>,
}

impl UsageReport {
    pub fn new(usage: LlmUsage, model: &str) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            cost: usage.cost(model),
        }
    }
}

/// Result for one task index.
#[derive(Clone, Debug, Serialize)]
pub struct IndexRecord {
    pub idx: usize,
    pub ys: Vec<String>,
    pub infos: Vec<TestOutcome>,
    /// Search trace; `None` for the naive baseline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Trace>,
    pub usage_so_far: UsageReport,
}

impl IndexRecord {
    fn mean_r(&self) -> f64 {
        if self.infos.is_empty() {
            return 0.0;
        }
        self.infos.iter().map(|i| i.r).sum::<f64>() / self.infos.len() as f64
    }

    fn any_r(&self) -> bool {
        self.infos.iter().any(|i| i.r != 0.0)
    }
}

/// Result of a batch.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub records: Vec<IndexRecord>,
    pub accuracy_avg: f64,
    pub accuracy_any: f64,
    pub usage: UsageReport,
}

/// Running totals reported after each index.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Progress {
    pub sum_r: f64,
    pub cnt_avg: f64,
    pub cnt_any: usize,
}

/// Runs every index in `options.indices`, calling `on_record` after each one.
pub async fn run<T, F>(
    config: &SearchConfig,
    task: &mut T,
    llm: &dyn LlmBackend,
    options: &RunOptions,
    mut on_record: F,
) -> Result<RunReport, RunError>
where
    T: Task,
    F: FnMut(&IndexRecord, &Progress),
{
    config.validate()?;
    let mut searcher = Searcher::<T>::from_config(config)?;
    let mut records = Vec::new();
    let mut progress = Progress::default();

    for idx in options.indices.clone() {
        let (ys, steps) = if options.naive {
            let ys = naive_solve(
                &*task,
                llm,
                idx,
                config.n_generate_sample,
                config.prompt_sample,
            )
            .await
            .map_err(|source| RunError::Naive { index: idx, source })?;
            (ys, None)
        } else {
            let outcome = searcher
                .solve(task, llm, idx)
                .await
                .map_err(|source| RunError::Solve { index: idx, source })?;
            (outcome.ys, Some(outcome.trace))
        };

        let infos = ys
            .iter()
            .map(|y| task.test_output(idx, y))
            .collect::<Result<Vec<_>, _>>()?;
        let record = IndexRecord {
            idx,
            ys,
            infos,
            steps,
            usage_so_far: UsageReport::new(llm.usage(), &config.backend),
        };

        progress.sum_r = record.infos.iter().map(|i| i.r).sum();
        progress.cnt_avg += record.mean_r();
        if record.any_r() {
            progress.cnt_any += 1;
        }
        info!(
            idx,
            sum_r = progress.sum_r,
            cnt_avg = progress.cnt_avg,
            cnt_any = progress.cnt_any,
            "index done"
        );
        on_record(&record, &progress);
        records.push(record);
    }

    let n = records.len();
    let (accuracy_avg, accuracy_any) = if n == 0 {
        (0.0, 0.0)
    } else {
        (progress.cnt_avg / n as f64, progress.cnt_any as f64 / n as f64)
    };
    Ok(RunReport {
        records,
        accuracy_avg,
        accuracy_any,
        usage: UsageReport::new(llm.usage(), &config.backend),
    })
}
