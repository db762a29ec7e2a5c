use clap::Parser;
use fsearch::cli::{detect_color_support, Args, PrintSink};
use fsearch::core::Query;
use fsearch::kernel::results::ResultAggregator;
use fsearch::kernel::services::adapters::{load_settings, SearchProcess};
use fsearch::kernel::services::ports::{SearchSettings, SearchStatus};
use fsearch::logging;
use std::cell::RefCell;
use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;
use tokio::signal::unix::{signal, SignalKind};

const EXIT_MATCHES: u8 = 0;
const EXIT_NO_MATCHES: u8 = 1;
const EXIT_FAILURE: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

fn main() -> ExitCode {
    let args = Args::parse();
    let _logging = logging::init(args.verbose);

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "search aborted");
            eprintln!("fsearch: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(args: &Args) -> Result<u8, Box<dyn Error>> {
    let settings = load_settings();
    let cwd = std::env::current_dir()?;
    let query = args.to_query(settings.defaults, &cwd)?;
    tracing::info!(
        text = %query.text(),
        dir = %query.directory().display(),
        flags = ?query.flags(),
        "search requested"
    );

    // 搜索句柄与 sink 都是 Rc，只在当前线程上跑
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, search(query, settings))
}

async fn search(query: Query, settings: SearchSettings) -> Result<u8, Box<dyn Error>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let results = Rc::new(RefCell::new(ResultAggregator::new(
        &query,
        settings.max_line_chars,
    )));
    let sink = PrintSink::new(results.clone(), detect_color_support());
    let process = SearchProcess::start(&query, Box::new(sink), &settings);

    while !process.is_finished() {
        tokio::select! {
            _ = process.wait() => {}
            _ = interrupt.recv() => {
                tracing::info!(pid = ?process.pid(), "interrupted, cancelling search");
                process.cancel();
            }
            _ = terminate.recv() => {
                tracing::info!(pid = ?process.pid(), "terminated, cancelling search");
                process.cancel();
            }
        }
    }

    let results = results.borrow();
    eprintln!("{}", results.summary());
    let code = match results.status() {
        Some(SearchStatus::Completed) if results.num_lines() > 0 => EXIT_MATCHES,
        Some(SearchStatus::Completed) => EXIT_NO_MATCHES,
        Some(SearchStatus::Cancelled) => EXIT_CANCELLED,
        Some(SearchStatus::Failed(_)) | None => EXIT_FAILURE,
    };
    Ok(code)
}
