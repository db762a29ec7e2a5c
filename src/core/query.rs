//! 搜索查询
//!
//! `Query` 是不可变的值对象：一旦通过校验，搜索文本非空、目录为存在的绝对路径。

use std::fmt;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    EmptyText,
    MultiLineText,
    RelativeDirectory(PathBuf),
    MissingDirectory(PathBuf),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::EmptyText => write!(f, "search text is empty"),
            QueryError::MultiLineText => write!(f, "search text spans multiple lines"),
            QueryError::RelativeDirectory(dir) => {
                write!(f, "search directory is not absolute: {}", dir.display())
            }
            QueryError::MissingDirectory(dir) => {
                write!(f, "search directory does not exist: {}", dir.display())
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// 匹配与目录遍历选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFlags {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub is_reg_exp: bool,
    pub include_subfolders: bool,
    pub exclude_hidden: bool,
    pub exclude_backup: bool,
    pub exclude_vcs: bool,
}

impl Default for QueryFlags {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            whole_word: false,
            is_reg_exp: false,
            include_subfolders: true,
            exclude_hidden: true,
            exclude_backup: true,
            exclude_vcs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    directory: PathBuf,
    flags: QueryFlags,
    file_types: Vec<String>,
}

impl Query {
    pub fn new(text: impl Into<String>, directory: impl Into<PathBuf>) -> Result<Self> {
        QueryBuilder::new(text, directory).build()
    }

    pub fn builder(text: impl Into<String>, directory: impl Into<PathBuf>) -> QueryBuilder {
        QueryBuilder::new(text, directory)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn flags(&self) -> QueryFlags {
        self.flags
    }

    /// 文件名 glob 列表；为空表示不限制文件类型
    pub fn file_types(&self) -> &[String] {
        &self.file_types
    }
}

pub struct QueryBuilder {
    text: String,
    directory: PathBuf,
    flags: QueryFlags,
    file_types: Vec<String>,
}

impl QueryBuilder {
    pub fn new(text: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            directory: directory.into(),
            flags: QueryFlags::default(),
            file_types: Vec::new(),
        }
    }

    pub fn flags(mut self, flags: QueryFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn case_sensitive(mut self, on: bool) -> Self {
        self.flags.case_sensitive = on;
        self
    }

    pub fn whole_word(mut self, on: bool) -> Self {
        self.flags.whole_word = on;
        self
    }

    pub fn reg_exp(mut self, on: bool) -> Self {
        self.flags.is_reg_exp = on;
        self
    }

    pub fn include_subfolders(mut self, on: bool) -> Self {
        self.flags.include_subfolders = on;
        self
    }

    pub fn exclude_hidden(mut self, on: bool) -> Self {
        self.flags.exclude_hidden = on;
        self
    }

    pub fn exclude_backup(mut self, on: bool) -> Self {
        self.flags.exclude_backup = on;
        self
    }

    pub fn exclude_vcs(mut self, on: bool) -> Self {
        self.flags.exclude_vcs = on;
        self
    }

    /// 以空白分隔的 glob 字符串，例如 `"*.c *.h"`
    pub fn file_type_string(mut self, globs: &str) -> Self {
        self.file_types = globs.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn file_types<I, S>(mut self, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_types = globs
            .into_iter()
            .map(Into::into)
            .filter(|g: &String| !g.trim().is_empty())
            .collect();
        self
    }

    pub fn build(self) -> Result<Query> {
        if self.text.is_empty() {
            return Err(QueryError::EmptyText);
        }
        if self.text.contains('\n') {
            return Err(QueryError::MultiLineText);
        }
        if !self.directory.is_absolute() {
            return Err(QueryError::RelativeDirectory(self.directory));
        }
        if !self.directory.is_dir() {
            return Err(QueryError::MissingDirectory(self.directory));
        }

        Ok(Query {
            text: self.text,
            directory: self.directory,
            flags: self.flags,
            file_types: self.file_types,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/query.rs"]
mod tests;
