//! `canopy` binary: run tree-of-thoughts search (or the naive baseline) over a YAML task.
//!
//! Prints running accuracy after each index and the final accuracies and token usage at the
//! end. With `--file`, the per-index records are also written as a JSON array.

mod logging;

use clap::Parser;
use cli::{write_json_output, Args, CliError, RunLog};

use canopy::runner::{self, RunOptions};
use canopy::{ChatOpenAI, SearchConfig, Task, TemplateTask};

const APP_NAME: &str = "canopy";

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("canopy: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply(APP_NAME, args.config.as_deref(), None)?;
    let base: SearchConfig =
        config::load_section(APP_NAME, args.config.as_deref(), "search")?.unwrap_or_default();
    let search = args.search_config(base);

    let _log_guard = logging::init(search.verbose, args.log_dir.as_deref())?;
    tracing::info!(
        backend = %search.backend,
        verbose = search.verbose,
        "search config loaded"
    );
    search.validate()?;

    let mut task = TemplateTask::load(&args.task)?;
    task.ensure_templates(&search.prompt_kinds(args.naive_run))?;
    let indices = args.index_range(task.len())?;
    tracing::info!(
        task = task.name(),
        start = indices.start,
        end = indices.end,
        naive = args.naive_run,
        "run start"
    );

    let llm = ChatOpenAI::from_env(search.backend.clone()).with_temperature(search.temperature);
    let options = RunOptions {
        indices,
        naive: args.naive_run,
    };

    let mut log = RunLog::new();
    let mut write_err: Option<CliError> = None;
    let report = runner::run(&search, &mut task, &llm, &options, |record, progress| {
        println!(
            "{} sum(accs) {} cnt_avg {} cnt_any {}",
            record.idx, progress.sum_r, progress.cnt_avg, progress.cnt_any
        );
        log.push(record.clone());
        if let Some(path) = args.file.as_deref() {
            if let Err(e) = write_json_output(&log, Some(path), args.pretty) {
                tracing::warn!(error = %e, "failed to write run log");
                write_err.get_or_insert(e);
            }
        }
    })
    .await?;
    if let Some(e) = write_err {
        return Err(e.into());
    }

    println!("{} {}", report.accuracy_avg, report.accuracy_any);
    let usage = &report.usage;
    match usage.cost {
        Some(cost) => println!(
            "usage_so_far completion_tokens {} prompt_tokens {} cost {:.4}",
            usage.completion_tokens, usage.prompt_tokens, cost
        ),
        None => println!(
            "usage_so_far completion_tokens {} prompt_tokens {}",
            usage.completion_tokens, usage.prompt_tokens
        ),
    }
    Ok(())
}
