//! # Canopy
//!
//! Tree-of-thoughts search over an LLM. A problem is solved in a fixed number of steps; each
//! step expands every candidate in the frontier, scores the expansions, and keeps a subset:
//!
//! ```text
//! frontier ──Generate──▶ new_ys ──Evaluate──▶ values ──Select──▶ next frontier
//! ```
//!
//! ## Main modules
//!
//! - [`search`]: [`Searcher`] (the loop), strategy traits [`Generator`], [`Evaluator`],
//!   [`Selector`] and their implementations, [`naive_solve`], [`Trace`].
//! - [`task`]: the [`Task`] contract (prompt wrappers, output parsers, answer checking) and
//!   [`TemplateTask`], a YAML-defined task.
//! - [`llm`]: [`LlmBackend`] with [`ChatOpenAI`] and [`MockLlm`].
//! - [`cache`]: [`ValueCache`], the per-task prompt → score memo.
//! - [`config`]: [`SearchConfig`] and the strategy enums.
//! - [`runner`]: batch runs over a range of task indices with accuracy and usage reporting.
//!
//! ## Example
//!
//! ```no_run
//! use canopy::{runner, ChatOpenAI, SearchConfig, TemplateTask};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut task = TemplateTask::load("tasks/sample.yaml")?;
//! let config = SearchConfig::default();
//! let llm = ChatOpenAI::from_env(&config.backend).with_temperature(config.temperature);
//! let options = runner::RunOptions { indices: 0..1, naive: false };
//! let report = runner::run(&config, &mut task, &llm, &options, |_, _| {}).await?;
//! println!("{}", report.accuracy_any);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod llm;
pub mod runner;
pub mod search;
pub mod task;

pub use cache::ValueCache;
pub use config::{
    ConfigError, EvaluateMethod, GenerateMethod, PromptMode, SearchConfig, SelectMethod,
};
pub use llm::{ChatOpenAI, LlmBackend, LlmError, LlmUsage, MockCall, MockLlm};
pub use runner::{IndexRecord, Progress, RunError, RunOptions, RunReport, UsageReport};
pub use search::{
    naive_solve, Evaluator, Generator, GreedySelector, ProposeGenerator, SampleGenerator,
    SampleSelector, Score, SearchError, SearchOutcome, Searcher, Selector, SolveError, StepRecord,
    Trace, ValueEvaluator, VoteEvaluator,
};
pub use task::{PromptKind, Task, TaskError, TemplateTask, TestOutcome};

#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
