//! 匹配高亮
//!
//! 输出严格交替的片段序列：非匹配、匹配、非匹配 ... 非匹配。
//! 首尾总是非匹配片段（可能为空），渲染端据此按奇偶位置着色。

use super::compiler::CompiledPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub text: &'a str,
    pub is_match: bool,
}

impl<'a> Fragment<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            is_match: false,
        }
    }

    fn matched(text: &'a str) -> Self {
        Self {
            text,
            is_match: true,
        }
    }
}

pub fn highlight<'a>(line: &'a str, pattern: &CompiledPattern) -> Vec<Fragment<'a>> {
    let Some(re) = pattern.matcher() else {
        // 正则模式：grep 已判定整行命中，无法可靠还原子匹配区间
        return vec![Fragment::plain(""), Fragment::matched(line), Fragment::plain("")];
    };

    let mut fragments = Vec::new();
    let mut pos = 0usize;
    for m in re.find_iter(line) {
        if m.start() == m.end() {
            continue;
        }
        fragments.push(Fragment::plain(&line[pos..m.start()]));
        fragments.push(Fragment::matched(m.as_str()));
        pos = m.end();
    }
    fragments.push(Fragment::plain(&line[pos..]));
    fragments
}

pub fn match_count(fragments: &[Fragment<'_>]) -> usize {
    fragments.iter().filter(|f| f.is_match).count()
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/highlight.rs"]
mod tests;
