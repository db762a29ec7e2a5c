use crate::core::query::QueryFlags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub shell: String,
    pub find_program: String,
    pub xargs_program: String,
    pub grep_program: String,
    /// Upper bound on bytes read from the pipeline per read.
    pub read_chunk_size: usize,
    pub max_line_chars: usize,
    pub vcs_dirs: Vec<String>,
    pub backup_globs: Vec<String>,
    pub defaults: QueryDefaults,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
            find_program: "find".to_string(),
            xargs_program: "xargs".to_string(),
            grep_program: "grep".to_string(),
            read_chunk_size: 8192,
            max_line_chars: 1000,
            vcs_dirs: [".git", ".svn", ".hg", ".bzr", "CVS", "_darcs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            backup_globs: vec!["*~".to_string(), "*.bak".to_string()],
            defaults: QueryDefaults::default(),
        }
    }
}

impl SearchSettings {
    pub fn chunk_size(&self) -> usize {
        self.read_chunk_size.max(1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub is_reg_exp: bool,
    pub include_subfolders: bool,
    pub exclude_hidden: bool,
    pub exclude_backup: bool,
    pub exclude_vcs: bool,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        let flags = QueryFlags::default();
        Self {
            case_sensitive: flags.case_sensitive,
            whole_word: flags.whole_word,
            is_reg_exp: flags.is_reg_exp,
            include_subfolders: flags.include_subfolders,
            exclude_hidden: flags.exclude_hidden,
            exclude_backup: flags.exclude_backup,
            exclude_vcs: flags.exclude_vcs,
        }
    }
}

impl From<QueryDefaults> for QueryFlags {
    fn from(d: QueryDefaults) -> Self {
        QueryFlags {
            case_sensitive: d.case_sensitive,
            whole_word: d.whole_word,
            is_reg_exp: d.is_reg_exp,
            include_subfolders: d.include_subfolders,
            exclude_hidden: d.exclude_hidden,
            exclude_backup: d.exclude_backup,
            exclude_vcs: d.exclude_vcs,
        }
    }
}
