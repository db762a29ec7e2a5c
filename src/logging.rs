use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::kernel::services::adapters::ensure_log_dir;

const LOG_FILE: &str = "fsearch.log";
const DEFAULT_FILTER: &str = "fsearch=info";

pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// 日志文件；`verbose` 时同时写一份到 stderr
fn log_writer<W>(file: W, verbose: bool) -> BoxMakeWriter
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    if verbose {
        BoxMakeWriter::new(file.and(io::stderr))
    } else {
        BoxMakeWriter::new(file)
    }
}

pub fn init(verbose: bool) -> Option<LoggingGuard> {
    let log_dir = ensure_log_dir()
        .or_else(|_| -> io::Result<PathBuf> {
            let dir = std::env::temp_dir().join("fsearch").join("logs");
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        })
        .ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(log_writer(non_blocking, verbose))
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!(panic = %panic_info, "panic");
        default_hook(panic_info);
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard { _guard: guard })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
