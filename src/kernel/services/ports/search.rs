use std::io;
use std::path::Path;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug)]
pub enum SearchError {
    /// The pipeline shell could not be launched.
    Spawn(io::Error),
    /// The child's output pipe could not be set up.
    Pipe(io::Error),
    /// A pipeline program could not be resolved on `PATH` before launch.
    ToolNotFound { program: String },
    /// The shell ran but a pipeline tool was missing or not executable.
    ToolUnavailable { exit_code: i32 },
    /// Reading the output or waiting for the child failed.
    Io(io::Error),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Spawn(e) => write!(f, "failed to launch search: {}", e),
            SearchError::Pipe(e) => write!(f, "failed to set up output pipe: {}", e),
            SearchError::ToolUnavailable { exit_code } => write!(
                f,
                "search tool not found or not executable (exit status {})",
                exit_code
            ),
            SearchError::ToolNotFound { program } => {
                write!(f, "search tool '{}' not found", program)
            }
            SearchError::Io(e) => write!(f, "search i/o error: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Spawn(e) | SearchError::Pipe(e) | SearchError::Io(e) => Some(e),
            SearchError::ToolNotFound { .. } | SearchError::ToolUnavailable { .. } => None,
        }
    }
}

impl From<io::Error> for SearchError {
    fn from(e: io::Error) -> Self {
        SearchError::Io(e)
    }
}

/// One parsed `<file>\0<line>:<text>` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    /// File name exactly as the OS reported it.
    pub path: Vec<u8>,
    /// 1-based.
    pub line: u64,
    pub text: String,
}

impl RawHit {
    pub fn new(path: impl Into<Vec<u8>>, line: u64, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line,
            text: text.into(),
        }
    }

    #[cfg(unix)]
    pub fn path(&self) -> &Path {
        use std::os::unix::ffi::OsStrExt;
        Path::new(std::ffi::OsStr::from_bytes(&self.path))
    }

    pub fn display_path(&self) -> String {
        String::from_utf8_lossy(&self.path).into_owned()
    }
}

#[derive(Debug)]
pub enum SearchStatus {
    Completed,
    Cancelled,
    Failed(SearchError),
}

impl SearchStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, SearchStatus::Failed(_))
    }
}

/// Receiver of a running search's output.
///
/// Both methods are only ever invoked from the search's local task (or, for a
/// failed start, from `SearchProcess::start` itself). `handle_finished`
/// is called at most once, and never after the owning `SearchProcess` was
/// destroyed.
pub trait SearchSink {
    fn handle_result(&mut self, hit: RawHit);
    fn handle_finished(&mut self, status: SearchStatus);
}
