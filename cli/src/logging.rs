//! Logging initialization: stderr by default, or a plain-text file under `--log-dir`.
//!
//! `RUST_LOG` wins when set. Otherwise the filter is `warn`, or `warn,canopy=info` when the
//! merged search config is verbose (`--verbose` or `verbose = true` under `[search]`), so the
//! per-step search report shows up.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_NAME: &str = "canopy.log";

/// Filter used when `RUST_LOG` is unset.
fn filter_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,canopy=info"
    } else {
        "warn"
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose)))
}

/// Installs the global subscriber. Keep the returned guard alive until exit so buffered file
/// logs are flushed.
pub fn init(
    verbose: bool,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = default_filter(verbose);
    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(dir = %dir.display(), "canopy logging to file");
            Ok(Some(guard))
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter);
            tracing_subscriber::registry().with(stderr_layer).try_init()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_canopy_info() {
        assert_eq!(filter_directive(true), "warn,canopy=info");
        assert_eq!(filter_directive(false), "warn");
    }
}
