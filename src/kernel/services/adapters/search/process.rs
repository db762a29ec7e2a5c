//! 搜索进程
//!
//! 一个 `SearchProcess` 对应一条 shell 管道，由当前线程 `LocalSet` 上的一个
//! 本地任务驱动。状态机：
//!
//! ```text
//! Running ──► Draining ──► Finished
//!    │            │
//!    └──────► Cancelling ─► Finished
//! ```
//!
//! - Running: 本地任务逐块读取 stdout，每次最多 `read_chunk_size` 字节
//! - Draining: 输出已到 EOF，等待回收子进程
//! - Cancelling: 已向整棵进程树发送 SIGTERM，剩余输出读完即丢弃
//!
//! 句柄与任务共享 `Rc<RefCell<SearchInner>>`；调用 sink 时不持有内部借用，
//! sink 回调里调用 `cancel`/`destroy` 是安全的。

use super::compiler::compile_command;
use super::parser::{LineParser, RecordSink};
use crate::core::query::Query;
use crate::kernel::services::adapters::process_table::{Pid, ProcessTable};
use crate::kernel::services::ports::{
    RawHit, SearchError, SearchSettings, SearchSink, SearchStatus,
};
use std::cell::RefCell;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::rc::Rc;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::watch;

/// `sh -c` 的 `$0`
const SHELL_ARG0: &str = "fsearch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Draining,
    Cancelling,
    Finished,
}

/// 一次读取中解析出的记录，释放借用后再交给 sink
#[derive(Default)]
struct Batch {
    hits: Vec<RawHit>,
    finished: bool,
}

impl RecordSink for Batch {
    fn emit(&mut self, hit: RawHit) {
        self.hits.push(hit);
    }

    fn emit_finished(&mut self) {
        self.finished = true;
    }
}

struct SearchInner {
    state: watch::Sender<SearchState>,
    sink: Option<Box<dyn SearchSink>>,
    detached: bool,
    cancelled: bool,
    root_pid: Option<Pid>,
}

impl SearchInner {
    fn state(&self) -> SearchState {
        *self.state.borrow()
    }

    fn set_state(&self, state: SearchState) {
        self.state.send_replace(state);
    }

    fn accepts_results(&self) -> bool {
        !self.detached && !self.cancelled && self.state() != SearchState::Finished
    }
}

pub struct SearchProcess {
    inner: Rc<RefCell<SearchInner>>,
    state_rx: watch::Receiver<SearchState>,
}

impl SearchProcess {
    /// 编译并启动查询；启动失败通过 `sink.handle_finished(Failed)` 同步报告一次。
    ///
    /// 必须在 `tokio::task::LocalSet` 中调用。
    pub fn start(query: &Query, mut sink: Box<dyn SearchSink>, settings: &SearchSettings) -> Self {
        let programs = [
            &settings.find_program,
            &settings.xargs_program,
            &settings.grep_program,
        ];
        for program in programs {
            if let Err(e) = which::which(program) {
                tracing::error!(program = %program, error = %e, "search tool not found");
                sink.handle_finished(SearchStatus::Failed(SearchError::ToolNotFound {
                    program: program.clone(),
                }));
                return Self::finished();
            }
        }

        let command = compile_command(query, settings);
        Self::start_command(&command, query.directory(), sink, settings)
    }

    /// 运行预先编译好的管道，搜索目录作为 `$1` 传入。
    pub fn start_command(
        script: &str,
        dir: &Path,
        mut sink: Box<dyn SearchSink>,
        settings: &SearchSettings,
    ) -> Self {
        tracing::debug!(shell = %settings.shell, dir = %dir.display(), script, "starting search");

        let spawned = Command::new(&settings.shell)
            .arg("-c")
            .arg(script)
            .arg(SHELL_ARG0)
            .arg(dir)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, shell = %settings.shell, "spawn search failed");
                sink.handle_finished(SearchStatus::Failed(SearchError::Spawn(e)));
                return Self::finished();
            }
        };

        let Some(stdout) = child.stdout.take() else {
            tracing::error!(pid = ?child.id(), "search stdout unavailable");
            let _ = child.start_kill();
            let err = io::Error::new(io::ErrorKind::BrokenPipe, "stdout unavailable");
            sink.handle_finished(SearchStatus::Failed(SearchError::Pipe(err)));
            return Self::finished();
        };

        let root_pid = child.id();
        let (state_tx, state_rx) = watch::channel(SearchState::Running);
        let inner = Rc::new(RefCell::new(SearchInner {
            state: state_tx,
            sink: Some(sink),
            detached: false,
            cancelled: false,
            root_pid,
        }));

        tokio::task::spawn_local(drive(
            inner.clone(),
            child,
            stdout,
            settings.chunk_size(),
        ));
        tracing::info!(pid = ?root_pid, "search started");

        Self { inner, state_rx }
    }

    fn finished() -> Self {
        let (state_tx, state_rx) = watch::channel(SearchState::Finished);
        Self {
            inner: Rc::new(RefCell::new(SearchInner {
                state: state_tx,
                sink: None,
                detached: false,
                cancelled: false,
                root_pid: None,
            })),
            state_rx,
        }
    }

    pub fn state(&self) -> SearchState {
        *self.state_rx.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == SearchState::Finished
    }

    /// pid of the pipeline's root shell.
    pub fn pid(&self) -> Option<Pid> {
        self.inner.borrow().root_pid
    }

    /// 等到子进程被回收、结束通知发出之后返回。
    pub async fn wait(&self) {
        let mut rx = self.state_rx.clone();
        let _ = rx.wait_for(|state| *state == SearchState::Finished).await;
    }

    /// 向整棵进程树发送 SIGTERM。已结束或已取消时为空操作。
    pub fn cancel(&self) {
        let root = {
            let mut inner = self.inner.borrow_mut();
            match inner.state() {
                state @ (SearchState::Finished | SearchState::Cancelling) => {
                    tracing::debug!(?state, "cancel ignored");
                    return;
                }
                SearchState::Running | SearchState::Draining => {}
            }
            inner.set_state(SearchState::Cancelling);
            inner.cancelled = true;
            inner.root_pid
        };

        if let Some(root) = root {
            terminate_tree(root);
        }
    }

    /// 取消并断开 sink：之后到达的结果和结束通知全部丢弃。
    pub fn destroy(&self) {
        self.cancel();
        let sink = {
            let mut inner = self.inner.borrow_mut();
            inner.detached = true;
            inner.sink.take()
        };
        drop(sink);
    }
}

impl Drop for SearchProcess {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.destroy();
        }
    }
}

/// 先快照再发信号：shell 退出后其子进程会被重新挂到 init 下
fn terminate_tree(root: Pid) {
    let table = ProcessTable::snapshot();
    let mut pids: Vec<Pid> = table.all_descendants(root).into_iter().collect();
    pids.sort_unstable();

    table.terminate(root);
    for pid in pids {
        table.terminate(pid);
    }
}

fn exit_status_to_result(status: Option<ExitStatus>, cancelled: bool) -> SearchStatus {
    if cancelled {
        return SearchStatus::Cancelled;
    }
    match status.and_then(|s| s.code()) {
        Some(code @ (126 | 127)) => SearchStatus::Failed(SearchError::ToolUnavailable {
            exit_code: code,
        }),
        _ => SearchStatus::Completed,
    }
}

async fn drive(
    inner: Rc<RefCell<SearchInner>>,
    mut child: Child,
    mut stdout: ChildStdout,
    chunk_size: usize,
) {
    let mut parser = LineParser::new();
    let mut chunk = vec![0u8; chunk_size];
    let mut read_error = None;

    loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let mut batch = Batch::default();
                parser.feed(&chunk[..n], &mut batch);
                deliver(&inner, batch.hits);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::warn!(error = %e, "reading search output failed");
                read_error = Some(e);
                break;
            }
        }
    }

    let mut batch = Batch::default();
    parser.flush(&mut batch);
    debug_assert!(batch.finished);
    drop(stdout);
    {
        let inner = inner.borrow();
        if inner.state() == SearchState::Running {
            inner.set_state(SearchState::Draining);
        }
    }
    deliver(&inner, batch.hits);
    tracing::debug!(pid = ?inner.borrow().root_pid, "search output closed");

    let status = match child.wait().await {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(error = %e, "waiting for search process failed");
            None
        }
    };
    finish(&inner, status, read_error);
}

/// 把结果交给 sink。调用期间不持有内部借用。
fn deliver(inner: &Rc<RefCell<SearchInner>>, hits: Vec<RawHit>) {
    if hits.is_empty() {
        return;
    }
    let sink = {
        let mut guard = inner.borrow_mut();
        if !guard.accepts_results() {
            return;
        }
        guard.sink.take()
    };
    let Some(mut sink) = sink else {
        return;
    };

    for hit in hits {
        if !inner.borrow().accepts_results() {
            break;
        }
        sink.handle_result(hit);
    }

    let mut guard = inner.borrow_mut();
    if !guard.detached {
        guard.sink = Some(sink);
    }
}

fn finish(
    inner: &Rc<RefCell<SearchInner>>,
    status: Option<ExitStatus>,
    read_error: Option<io::Error>,
) {
    let (sink, result) = {
        let mut guard = inner.borrow_mut();
        let result = match read_error {
            Some(e) if !guard.cancelled => SearchStatus::Failed(SearchError::Io(e)),
            _ => exit_status_to_result(status, guard.cancelled),
        };
        tracing::info!(pid = ?guard.root_pid, ?status, "search finished");
        guard.set_state(SearchState::Finished);
        (guard.sink.take(), result)
    };

    if let Some(mut sink) = sink {
        sink.handle_finished(result);
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/process.rs"]
mod tests;
