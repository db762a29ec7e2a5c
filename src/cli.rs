//! 命令行前端：参数解析与结果输出

use crate::core::query::{Query, QueryError, QueryFlags};
use crate::kernel::results::{LineMatch, ResultAggregator};
use crate::kernel::services::ports::{QueryDefaults, RawHit, SearchSink, SearchStatus};
use clap::Parser;
use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// fsearch - search file contents with find, xargs and grep
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Text to search for (a single line)
    pub text: String,

    /// Directory to search (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Ignore case
    #[arg(short = 'i', long, conflicts_with = "case_sensitive")]
    pub ignore_case: bool,

    /// Match case exactly
    #[arg(short = 's', long)]
    pub case_sensitive: bool,

    /// Match whole words only
    #[arg(short = 'w', long)]
    pub word: bool,

    /// Treat TEXT as an extended regular expression
    #[arg(short = 'e', long)]
    pub regex: bool,

    /// Do not descend into subdirectories
    #[arg(long)]
    pub no_recursive: bool,

    /// Also search hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Also search backup files
    #[arg(long)]
    pub backups: bool,

    /// Also search version control directories
    #[arg(long)]
    pub vcs: bool,

    /// Only search files whose name matches GLOB (repeatable)
    #[arg(short = 't', long = "type", value_name = "GLOB")]
    pub file_types: Vec<String>,

    /// Mirror log output to stderr
    #[arg(long)]
    pub verbose: bool,
}

impl Args {
    /// 命令行开关覆盖配置文件中的默认值
    pub fn flags(&self, defaults: QueryDefaults) -> QueryFlags {
        let mut flags = QueryFlags::from(defaults);
        if self.ignore_case {
            flags.case_sensitive = false;
        }
        if self.case_sensitive {
            flags.case_sensitive = true;
        }
        if self.word {
            flags.whole_word = true;
        }
        if self.regex {
            flags.is_reg_exp = true;
        }
        if self.no_recursive {
            flags.include_subfolders = false;
        }
        if self.hidden {
            flags.exclude_hidden = false;
        }
        if self.backups {
            flags.exclude_backup = false;
        }
        if self.vcs {
            flags.exclude_vcs = false;
        }
        flags
    }

    pub fn to_query(&self, defaults: QueryDefaults, cwd: &Path) -> Result<Query, QueryError> {
        let dir = match &self.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };
        Query::builder(self.text.clone(), dir)
            .flags(self.flags(defaults))
            .file_types(self.file_types.iter().cloned())
            .build()
    }
}

/// 颜色输出：NO_COLOR 关闭，否则仅在 stdout 为终端时开启
pub fn detect_color_support() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    io::stdout().is_terminal() && std::env::var("TERM").is_ok_and(|term| term != "dumb")
}

const RESET: &str = "\x1b[0m";
const PATH_STYLE: &str = "\x1b[35m";
const LINE_STYLE: &str = "\x1b[32m";
const MATCH_STYLE: &str = "\x1b[1;31m";

/// 边收边打印的 sink，结果同时记入共享的 `ResultAggregator`
pub struct PrintSink {
    results: Rc<RefCell<ResultAggregator>>,
    color: bool,
    last_file: Option<usize>,
    closed: bool,
}

impl PrintSink {
    pub fn new(results: Rc<RefCell<ResultAggregator>>, color: bool) -> Self {
        Self {
            results,
            color,
            last_file: None,
            closed: false,
        }
    }

    fn print(&mut self, file_index: usize) -> io::Result<()> {
        let results = self.results.borrow();
        let Some(file) = results.file(file_index) else {
            return Ok(());
        };
        let Some(line) = file.lines.last() else {
            return Ok(());
        };

        let mut out = io::stdout().lock();
        if self.last_file != Some(file_index) {
            if self.last_file.is_some() {
                writeln!(out)?;
            }
            if self.color {
                writeln!(out, "{}{}{}", PATH_STYLE, file.display, RESET)?;
            } else {
                writeln!(out, "{}", file.display)?;
            }
            self.last_file = Some(file_index);
        }
        writeln!(out, "{}", render_line(line, self.color))?;
        Ok(())
    }
}

impl SearchSink for PrintSink {
    fn handle_result(&mut self, hit: RawHit) {
        let file_index = self.results.borrow_mut().add(hit);
        if self.closed {
            return;
        }
        if let Err(e) = self.print(file_index) {
            // 下游关闭（例如 `| head`）后不再输出，搜索照常收尾
            tracing::debug!(error = %e, "stdout closed");
            self.closed = true;
        }
    }

    fn handle_finished(&mut self, status: SearchStatus) {
        self.results.borrow_mut().finish(status);
    }
}

pub fn render_line(line: &LineMatch, color: bool) -> String {
    let mut out = String::with_capacity(line.text.len() + 16);
    if color {
        out.push_str(LINE_STYLE);
        out.push_str(&line.line.to_string());
        out.push_str(RESET);
    } else {
        out.push_str(&line.line.to_string());
    }
    out.push(':');
    for fragment in line.fragments() {
        if color && fragment.is_match {
            out.push_str(MATCH_STYLE);
            out.push_str(fragment.text);
            out.push_str(RESET);
        } else {
            out.push_str(fragment.text);
        }
    }
    if line.truncated {
        out.push('…');
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
