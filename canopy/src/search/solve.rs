//! Search loop and naive baseline.
//!
//! `Start → {Generate → Evaluate → Select} × steps → Done`. The frontier starts as one empty
//! candidate; every step expands each frontier member in order, scores the flat expanded set,
//! selects the next frontier, and appends a [`StepRecord`] before the frontier is replaced.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{
    Evaluator, Generator, GreedySelector, ProposeGenerator, SampleGenerator, SampleSelector,
    Score, SearchError, Selector, StepRecord, Trace, ValueEvaluator, VoteEvaluator,
};
use crate::config::{
    ConfigError, EvaluateMethod, GenerateMethod, PromptMode, SearchConfig, SelectMethod,
};
use crate::llm::LlmBackend;
use crate::task::{Task, TaskError};

/// A search aborted by a failing step. `trace` holds every step completed before `step`.
#[derive(Debug, Error)]
#[error("search aborted at step {step}: {source}")]
pub struct SolveError {
    pub step: usize,
    pub trace: Trace,
    #[source]
    pub source: SearchError,
}

/// Final frontier and the full trace of a completed search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub ys: Vec<String>,
    pub trace: Trace,
}

/// The search loop with its three strategies fixed at construction.
pub struct Searcher<T: Task> {
    generator: Box<dyn Generator<T>>,
    evaluator: Box<dyn Evaluator<T>>,
    selector: Box<dyn Selector>,
    verbose: bool,
}

impl<T: Task> Searcher<T> {
    pub fn new(
        generator: Box<dyn Generator<T>>,
        evaluator: Box<dyn Evaluator<T>>,
        selector: Box<dyn Selector>,
    ) -> Self {
        Self {
            generator,
            evaluator,
            selector,
            verbose: false,
        }
    }

    /// When true, each step's ranked expansions and choices are logged at info level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates `config` and builds the strategies it names.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator: Box<dyn Generator<T>> = match config.method_generate {
            GenerateMethod::Sample => Box::new(SampleGenerator::new(
                config.n_generate_sample,
                config.prompt_sample,
            )),
            GenerateMethod::Propose => Box::new(ProposeGenerator),
        };
        let evaluator: Box<dyn Evaluator<T>> = match config.method_evaluate {
            EvaluateMethod::Value => Box::new(ValueEvaluator::new(
                config.n_evaluate_sample,
                config.cache_value,
            )),
            EvaluateMethod::Vote => Box::new(VoteEvaluator::new(config.n_evaluate_sample)),
        };
        let selector: Box<dyn Selector> = match config.method_select {
            SelectMethod::Sample => {
                Box::new(SampleSelector::new(config.n_select_sample, config.seed))
            }
            SelectMethod::Greedy => Box::new(GreedySelector::new(config.n_select_sample)),
        };
        Ok(Self::new(generator, evaluator, selector).with_verbose(config.verbose))
    }

    /// Runs the full search on input `index` of `task`.
    ///
    /// Backend failures abort the current step; the returned [`SolveError`] carries the trace
    /// of the steps that completed.
    #[instrument(name = "solve", skip_all, fields(index = index))]
    pub async fn solve(
        &mut self,
        task: &mut T,
        llm: &dyn LlmBackend,
        index: usize,
    ) -> Result<SearchOutcome, SolveError> {
        let abort = |step: usize, trace: Trace, source: SearchError| SolveError {
            step,
            trace,
            source,
        };
        let x = task
            .get_input(index)
            .map_err(|e| abort(0, Trace::new(), e.into()))?;
        let steps = task.steps();
        let stops = task.stops().to_vec();
        if stops.len() < steps {
            let e = TaskError::StopsTooShort {
                steps,
                stops: stops.len(),
            };
            return Err(abort(0, Trace::new(), e.into()));
        }
        debug!(
            steps,
            generator = self.generator.name(),
            evaluator = self.evaluator.name(),
            selector = self.selector.name(),
            "search start"
        );

        let mut ys = vec![String::new()];
        let mut trace = Trace::new();
        for (step, stop) in stops.iter().take(steps).enumerate() {
            match self.step(task, llm, &x, step, stop.as_deref(), &ys).await {
                Ok(record) => {
                    ys = record.select_new_ys.clone();
                    trace.push(record);
                }
                Err(source) => return Err(abort(step, trace, source)),
            }
        }
        if self.verbose {
            info!(ys = ?ys, "search done");
        }
        Ok(SearchOutcome { ys, trace })
    }

    async fn step(
        &mut self,
        task: &mut T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        step: usize,
        stop: Option<&str>,
        ys: &[String],
    ) -> Result<StepRecord, SearchError> {
        let mut new_ys = Vec::new();
        for y in ys {
            let expanded = self.generator.generate(task, llm, x, y, stop).await?;
            new_ys.extend(expanded);
        }

        let values = self.evaluator.evaluate(task, llm, x, &new_ys).await?;
        if values.len() != new_ys.len() {
            return Err(SearchError::ScoreCountMismatch {
                expected: new_ys.len(),
                actual: values.len(),
            });
        }

        let select_ids = self.selector.select(&values)?;
        let select_new_ys = select_ids
            .iter()
            .map(|&i| {
                new_ys
                    .get(i)
                    .cloned()
                    .ok_or(SearchError::SelectionOutOfRange {
                        index: i,
                        len: new_ys.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let record = StepRecord {
            step,
            ys: ys.to_vec(),
            new_ys,
            values,
            select_ids,
            select_new_ys,
        };
        self.report(&record);
        Ok(record)
    }

    fn report(&self, record: &StepRecord) {
        let mut ranked: Vec<(&str, Score)> = record
            .new_ys
            .iter()
            .map(String::as_str)
            .zip(record.values.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        if self.verbose {
            info!(
                step = record.step,
                new_ys = ?ranked.iter().map(|r| r.0).collect::<Vec<_>>(),
                values = ?ranked.iter().map(|r| r.1).collect::<Vec<_>>(),
                choices = ?record.select_new_ys,
                "step done"
            );
        } else {
            debug!(
                step = record.step,
                expanded = record.new_ys.len(),
                selected = ?record.select_ids,
                "step done"
            );
        }
    }
}

/// One-shot baseline: `width` samples from the empty candidate, no stop, no evaluation,
/// no selection. Never touches the value cache.
#[instrument(name = "naive_solve", skip_all, fields(index = index))]
pub async fn naive_solve<T: Task>(
    task: &T,
    llm: &dyn LlmBackend,
    index: usize,
    width: usize,
    prompt_mode: PromptMode,
) -> Result<Vec<String>, SearchError> {
    let x = task.get_input(index)?;
    SampleGenerator::new(width, prompt_mode)
        .generate(task, llm, &x, "", None)
        .await
}
