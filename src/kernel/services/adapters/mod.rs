//! Service adapters: OS specific implementations (processes, pipes, settings files).

pub mod process_table;
pub mod search;
pub mod settings;

pub use process_table::{Pid, ProcessNode, ProcessTable};
pub use search::{
    compile_command, compile_pattern, highlight, CompiledPattern, Fragment, LineParser,
    SearchProcess, SearchState,
};
pub use settings::{ensure_log_dir, get_log_dir, get_settings_path, load_settings, load_settings_from};
