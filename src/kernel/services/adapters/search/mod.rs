//! 多文件文本搜索
//!
//! - compiler: 查询 → `find | xargs grep` 命令行 + 本地高亮用的正则
//! - parser: 把 `grep -Z -n -H` 的字节流切成记录
//! - process: 驱动管道子进程，可取消
//! - highlight: 把一行切成匹配 / 非匹配片段

mod compiler;
mod highlight;
mod parser;
mod process;

pub use compiler::{
    compile_command, compile_command_with, compile_pattern, escape_ere, shell_quote,
    CompiledPattern, DIRECTORY_PARAM,
};
pub use highlight::{highlight, match_count, Fragment};
pub use parser::{parse_record, LineParser, RecordSink};
pub use process::{SearchProcess, SearchState};
