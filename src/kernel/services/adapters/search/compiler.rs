//! 查询编译
//!
//! 同一个 `Query` 编译出两样东西：
//! - 交给 shell 的 `find | xargs grep` 命令行
//! - 用于结果高亮的 `CompiledPattern`
//!
//! 两者共享同一份模式文本（转义、整词边界），grep 判定为命中的行，
//! 高亮时才能重新定位到相同的匹配区间。

use crate::core::query::Query;
use crate::kernel::services::ports::SearchSettings;
use regex::{Regex, RegexBuilder};

/// 搜索目录作为 `sh -c` 的第一个位置参数传入，按原始字节交给 find
pub const DIRECTORY_PARAM: &str = "\"$1\"";

/// ERE 中需要转义的元字符
const ERE_META: &[char] = &[
    '\\', '.', '[', ']', '(', ')', '*', '+', '?', '{', '}', '|', '^', '$',
];

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// 传给 `grep -E -e` 的模式
    tool_pattern: String,
    case_sensitive: bool,
    /// 正则模式下为 None：整行视为一个匹配
    matcher: Option<Regex>,
}

impl CompiledPattern {
    pub fn tool_pattern(&self) -> &str {
        &self.tool_pattern
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn matcher(&self) -> Option<&Regex> {
        self.matcher.as_ref()
    }

    pub fn is_whole_line(&self) -> bool {
        self.matcher.is_none()
    }
}

pub fn compile_pattern(query: &Query) -> CompiledPattern {
    let flags = query.flags();
    let text = query.text();

    if flags.is_reg_exp {
        let tool_pattern = if flags.whole_word {
            format!(r"\b({})\b", text)
        } else {
            text.to_string()
        };
        return CompiledPattern {
            tool_pattern,
            case_sensitive: flags.case_sensitive,
            matcher: None,
        };
    }

    let escaped = escape_ere(text);
    let local = regex::escape(text);
    let (tool_pattern, local) = if flags.whole_word {
        (format!(r"\b{}\b", escaped), format!(r"\b{}\b", local))
    } else {
        (escaped, local)
    };

    // 纯转义后的字面量不会编译失败；失败时退化为整行高亮
    let matcher = match RegexBuilder::new(&local)
        .case_insensitive(!flags.case_sensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(error = %e, pattern = %local, "highlight pattern rejected");
            None
        }
    };

    CompiledPattern {
        tool_pattern,
        case_sensitive: flags.case_sensitive,
        matcher,
    }
}

pub fn compile_command(query: &Query, settings: &SearchSettings) -> String {
    let pattern = compile_pattern(query);
    compile_command_with(query, &pattern, settings)
}

pub fn compile_command_with(
    query: &Query,
    pattern: &CompiledPattern,
    settings: &SearchSettings,
) -> String {
    let flags = query.flags();
    let mut find: Vec<String> = vec![
        shell_quote(&settings.find_program),
        DIRECTORY_PARAM.to_string(),
        "-mindepth".to_string(),
        "1".to_string(),
    ];
    if !flags.include_subfolders {
        find.push("-maxdepth".to_string());
        find.push("1".to_string());
    }

    let mut pruned: Vec<String> = Vec::new();
    if flags.exclude_hidden {
        pruned.push(".*".to_string());
    }
    if flags.exclude_vcs {
        pruned.extend(settings.vcs_dirs.iter().cloned());
    }
    if !pruned.is_empty() {
        find.push(r"\(".to_string());
        push_name_alternatives(&mut find, &pruned);
        find.push(r"\)".to_string());
        find.push("-prune".to_string());
        find.push("-o".to_string());
    }

    find.push("-type".to_string());
    find.push("f".to_string());

    if !query.file_types().is_empty() {
        find.push(r"\(".to_string());
        push_name_alternatives(&mut find, query.file_types());
        find.push(r"\)".to_string());
    }
    if flags.exclude_backup && !settings.backup_globs.is_empty() {
        find.push("!".to_string());
        find.push(r"\(".to_string());
        push_name_alternatives(&mut find, &settings.backup_globs);
        find.push(r"\)".to_string());
    }
    find.push("-print0".to_string());

    let mut grep: Vec<String> = vec![
        shell_quote(&settings.xargs_program),
        "-0".to_string(),
        "-r".to_string(),
        shell_quote(&settings.grep_program),
        "-H".to_string(),
        "-I".to_string(),
        "-n".to_string(),
        "-s".to_string(),
        "-Z".to_string(),
        "-E".to_string(),
    ];
    if !pattern.case_sensitive() {
        grep.push("-i".to_string());
    }
    grep.push("-e".to_string());
    grep.push(shell_quote(pattern.tool_pattern()));

    format!("{} | {}", find.join(" "), grep.join(" "))
}

fn push_name_alternatives<S: AsRef<str>>(out: &mut Vec<String>, names: &[S]) {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push("-o".to_string());
        }
        out.push("-name".to_string());
        out.push(shell_quote(name.as_ref()));
    }
}

/// 单引号包裹；内部的 `'` 写成 `'\''`
pub fn shell_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str(r"'\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

pub fn escape_ere(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for ch in s.chars() {
        if ERE_META.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/compiler.rs"]
mod tests;
