//! 搜索结果汇总
//!
//! 把 `RawHit` 按文件分组（首次出现顺序），为每行预先计算显示文本、
//! 截断标记与高亮区间，并维护匹配 / 行 / 文件计数。

use crate::core::query::Query;
use crate::kernel::services::adapters::search::{
    compile_pattern, highlight, CompiledPattern, Fragment,
};
use crate::kernel::services::ports::{RawHit, SearchStatus};
use rustc_hash::FxHashMap;
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct LineMatch {
    pub line: u64,
    /// NUL 已替换为 U+FFFD，超长时已截断
    pub text: String,
    pub truncated: bool,
    /// `text` 中的匹配区间（字节偏移，升序不重叠）
    pub spans: Vec<Range<usize>>,
}

impl LineMatch {
    /// 还原成交替的非匹配 / 匹配片段，首尾均为非匹配。
    pub fn fragments(&self) -> Vec<Fragment<'_>> {
        let mut out = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut pos = 0usize;
        for span in &self.spans {
            out.push(Fragment {
                text: &self.text[pos..span.start],
                is_match: false,
            });
            out.push(Fragment {
                text: &self.text[span.clone()],
                is_match: true,
            });
            pos = span.end;
        }
        out.push(Fragment {
            text: &self.text[pos..],
            is_match: false,
        });
        out
    }

    pub fn match_count(&self) -> usize {
        self.spans.len().max(1)
    }
}

#[derive(Debug, Clone)]
pub struct FileMatches {
    pub path: Vec<u8>,
    /// 相对于查询目录的路径
    pub display: String,
    pub lines: Vec<LineMatch>,
}

pub struct ResultAggregator {
    root: Vec<u8>,
    pattern: CompiledPattern,
    max_line_chars: usize,
    files: Vec<FileMatches>,
    index: FxHashMap<Vec<u8>, usize>,
    num_matches: usize,
    num_lines: usize,
    status: Option<SearchStatus>,
}

impl ResultAggregator {
    pub fn new(query: &Query, max_line_chars: usize) -> Self {
        let mut root = query.directory().as_os_str().as_encoded_bytes().to_vec();
        while root.len() > 1 && root.last() == Some(&b'/') {
            root.pop();
        }
        Self {
            root,
            pattern: compile_pattern(query),
            max_line_chars,
            files: Vec::new(),
            index: FxHashMap::default(),
            num_matches: 0,
            num_lines: 0,
            status: None,
        }
    }

    /// 记录一行结果，返回其所在文件的下标。
    pub fn add(&mut self, hit: RawHit) -> usize {
        let line = self.build_line(hit.line, &hit.text);
        self.num_matches += line.match_count();
        self.num_lines += 1;

        let file_index = match self.index.get(&hit.path) {
            Some(&idx) => idx,
            None => {
                let idx = self.files.len();
                let display = self.display_path(&hit.path);
                self.index.insert(hit.path.clone(), idx);
                self.files.push(FileMatches {
                    path: hit.path,
                    display,
                    lines: Vec::new(),
                });
                idx
            }
        };
        self.files[file_index].lines.push(line);
        file_index
    }

    pub fn finish(&mut self, status: SearchStatus) {
        if self.status.is_some() {
            tracing::warn!(?status, "duplicate finish ignored");
            return;
        }
        self.status = Some(status);
    }

    fn build_line(&self, line: u64, raw: &str) -> LineMatch {
        let cleaned = raw.replace('\0', "\u{FFFD}");
        let (text, truncated) = match cleaned.char_indices().nth(self.max_line_chars) {
            Some((cut, _)) => (cleaned[..cut].to_string(), true),
            None => (cleaned, false),
        };

        let mut spans = Vec::new();
        let mut pos = 0usize;
        for fragment in highlight(&text, &self.pattern) {
            let end = pos + fragment.text.len();
            if fragment.is_match && end > pos {
                spans.push(pos..end);
            }
            pos = end;
        }

        LineMatch {
            line,
            text,
            truncated,
            spans,
        }
    }

    fn display_path(&self, path: &[u8]) -> String {
        let relative = path
            .strip_prefix(self.root.as_slice())
            .and_then(|rest| {
                if self.root == b"/" {
                    Some(rest)
                } else {
                    rest.strip_prefix(b"/")
                }
            })
            .filter(|rest| !rest.is_empty())
            .unwrap_or(path);
        String::from_utf8_lossy(relative).into_owned()
    }

    pub fn files(&self) -> &[FileMatches] {
        &self.files
    }

    pub fn file(&self, index: usize) -> Option<&FileMatches> {
        self.files.get(index)
    }

    pub fn num_matches(&self) -> usize {
        self.num_matches
    }

    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn status(&self) -> Option<&SearchStatus> {
        self.status.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_some()
    }

    pub fn summary(&self) -> String {
        match &self.status {
            None => "(searching)".to_string(),
            Some(SearchStatus::Cancelled) => "(search was cancelled)".to_string(),
            Some(SearchStatus::Failed(e)) => format!("(search failed: {})", e),
            Some(SearchStatus::Completed) if self.num_lines == 0 => {
                "(no matching files found)".to_string()
            }
            Some(SearchStatus::Completed) => format!(
                "found {} {} ({} {}) in {} {}",
                self.num_matches,
                plural(self.num_matches, "match", "matches"),
                self.num_lines,
                plural(self.num_lines, "line", "lines"),
                self.num_files(),
                plural(self.num_files(), "file", "files"),
            ),
        }
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/results.rs"]
mod tests;
