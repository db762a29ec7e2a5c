use super::*;
use crate::core::query::Query;
use crate::kernel::services::adapters::search::compiler::compile_pattern;
use tempfile::{tempdir, TempDir};

fn pattern(dir: &TempDir, text: &str, case_sensitive: bool, whole_word: bool) -> CompiledPattern {
    let query = Query::builder(text, dir.path())
        .case_sensitive(case_sensitive)
        .whole_word(whole_word)
        .build()
        .unwrap();
    compile_pattern(&query)
}

fn pairs<'a>(fragments: &[Fragment<'a>]) -> Vec<(&'a str, bool)> {
    fragments.iter().map(|f| (f.text, f.is_match)).collect()
}

#[test]
fn alternates_plain_and_match_fragments() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "at", true, false);
    let fragments = highlight("the cat sat", &p);

    assert_eq!(
        pairs(&fragments),
        vec![
            ("the c", false),
            ("at", true),
            (" s", false),
            ("at", true),
            ("", false),
        ]
    );
    assert_eq!(match_count(&fragments), 2);
}

#[test]
fn adjacent_matches_are_separated_by_empty_fragment() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "ab", true, false);
    assert_eq!(
        pairs(&highlight("abab", &p)),
        vec![("", false), ("ab", true), ("", false), ("ab", true), ("", false)]
    );
}

#[test]
fn case_insensitive_keeps_original_casing() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "foo", false, false);
    assert_eq!(
        pairs(&highlight("Foo and FOO", &p)),
        vec![("", false), ("Foo", true), (" and ", false), ("FOO", true), ("", false)]
    );
}

#[test]
fn whole_word_skips_embedded_occurrences() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "cat", true, true);
    assert_eq!(
        pairs(&highlight("concat cat cats", &p)),
        vec![("concat ", false), ("cat", true), (" cats", false)]
    );
}

#[test]
fn metacharacters_match_literally() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "a.c", true, false);
    assert_eq!(
        pairs(&highlight("abc a.c", &p)),
        vec![("abc ", false), ("a.c", true), ("", false)]
    );
}

#[test]
fn multibyte_text_splits_on_char_boundaries() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "é", false, false);
    assert_eq!(
        pairs(&highlight("café É", &p)),
        vec![("caf", false), ("é", true), (" ", false), ("É", true), ("", false)]
    );
}

#[test]
fn no_match_degrades_to_single_plain_fragment() {
    let dir = tempdir().unwrap();
    let p = pattern(&dir, "zzz", true, false);
    let fragments = highlight("nothing here", &p);
    assert_eq!(pairs(&fragments), vec![("nothing here", false)]);
    assert_eq!(match_count(&fragments), 0);
}

#[test]
fn regex_mode_marks_whole_line() {
    let dir = tempdir().unwrap();
    let query = Query::builder("c.t", dir.path())
        .reg_exp(true)
        .build()
        .unwrap();
    let p = compile_pattern(&query);
    assert_eq!(
        pairs(&highlight("the cat", &p)),
        vec![("", false), ("the cat", true), ("", false)]
    );
}
