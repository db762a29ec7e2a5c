use super::*;
use crate::kernel::services::ports::SearchError;
use tempfile::tempdir;

fn hit(dir: &std::path::Path, name: &str, line: u64, text: &str) -> RawHit {
    let path = format!("{}/{}", dir.display(), name);
    RawHit::new(path.into_bytes(), line, text)
}

#[test]
fn groups_by_file_in_first_seen_order() {
    let dir = tempdir().unwrap();
    let query = Query::new("cat", dir.path()).unwrap();
    let mut agg = ResultAggregator::new(&query, 1000);

    assert_eq!(agg.add(hit(dir.path(), "b.txt", 3, "cat")), 0);
    assert_eq!(agg.add(hit(dir.path(), "sub/a.txt", 1, "the cat sat")), 1);
    assert_eq!(agg.add(hit(dir.path(), "b.txt", 9, "cat cat")), 0);

    let files = agg.files();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].display, "b.txt");
    assert_eq!(files[1].display, "sub/a.txt");
    assert_eq!(
        files[0].lines.iter().map(|l| l.line).collect::<Vec<_>>(),
        vec![3, 9]
    );
    assert_eq!(agg.num_files(), 2);
    assert_eq!(agg.num_lines(), 3);
    assert_eq!(agg.num_matches(), 4);
}

#[test]
fn line_fragments_alternate() {
    let dir = tempdir().unwrap();
    let query = Query::new("cat", dir.path()).unwrap();
    let mut agg = ResultAggregator::new(&query, 1000);
    agg.add(hit(dir.path(), "a.txt", 1, "the cat sat"));

    let line = &agg.files()[0].lines[0];
    assert_eq!(line.spans, vec![4..7]);
    let texts: Vec<(&str, bool)> = line
        .fragments()
        .iter()
        .map(|f| (f.text, f.is_match))
        .collect();
    assert_eq!(
        texts,
        vec![("the ", false), ("cat", true), (" sat", false)]
    );
}

#[test]
fn unmatched_line_counts_once() {
    let dir = tempdir().unwrap();
    let query = Query::builder("cat", dir.path())
        .case_sensitive(true)
        .build()
        .unwrap();
    let mut agg = ResultAggregator::new(&query, 1000);
    agg.add(hit(dir.path(), "a.txt", 1, "CAT"));

    let line = &agg.files()[0].lines[0];
    assert!(line.spans.is_empty());
    assert_eq!(line.fragments().len(), 1);
    assert_eq!(agg.num_matches(), 1);
}

#[test]
fn regex_mode_marks_the_whole_line() {
    let dir = tempdir().unwrap();
    let query = Query::builder("c.t", dir.path())
        .reg_exp(true)
        .build()
        .unwrap();
    let mut agg = ResultAggregator::new(&query, 1000);
    agg.add(hit(dir.path(), "a.txt", 1, "cat cot"));

    let line = &agg.files()[0].lines[0];
    assert_eq!(line.spans, vec![0..7]);
    assert_eq!(agg.num_matches(), 1);
}

#[test]
fn long_lines_are_truncated_on_char_boundaries() {
    let dir = tempdir().unwrap();
    let query = Query::new("é", dir.path()).unwrap();
    let mut agg = ResultAggregator::new(&query, 3);
    agg.add(hit(dir.path(), "a.txt", 1, "éééé"));
    agg.add(hit(dir.path(), "a.txt", 2, "éé"));

    let lines = &agg.files()[0].lines;
    assert_eq!(lines[0].text, "ééé");
    assert!(lines[0].truncated);
    assert_eq!(lines[0].spans.len(), 3);
    assert_eq!(lines[1].text, "éé");
    assert!(!lines[1].truncated);
}

#[test]
fn nul_bytes_are_replaced() {
    let dir = tempdir().unwrap();
    let query = Query::new("x", dir.path()).unwrap();
    let mut agg = ResultAggregator::new(&query, 1000);
    agg.add(hit(dir.path(), "a.txt", 1, "a\0x"));

    assert_eq!(agg.files()[0].lines[0].text, "a\u{FFFD}x");
}

#[test]
fn foreign_paths_are_shown_verbatim() {
    let dir = tempdir().unwrap();
    let query = Query::new("x", dir.path()).unwrap();
    let mut agg = ResultAggregator::new(&query, 1000);
    agg.add(RawHit::new(b"/elsewhere/f".to_vec(), 1, "x"));

    assert_eq!(agg.files()[0].display, "/elsewhere/f");
}

#[test]
fn summary_texts() {
    let dir = tempdir().unwrap();
    let query = Query::new("cat", dir.path()).unwrap();

    let mut agg = ResultAggregator::new(&query, 1000);
    assert_eq!(agg.summary(), "(searching)");
    agg.add(hit(dir.path(), "a.txt", 1, "cat"));
    agg.finish(SearchStatus::Completed);
    assert_eq!(agg.summary(), "found 1 match (1 line) in 1 file");

    agg.add(hit(dir.path(), "b.txt", 2, "cat cat"));
    assert_eq!(agg.summary(), "found 3 matches (2 lines) in 2 files");

    let mut empty = ResultAggregator::new(&query, 1000);
    empty.finish(SearchStatus::Completed);
    assert_eq!(empty.summary(), "(no matching files found)");

    let mut cancelled = ResultAggregator::new(&query, 1000);
    cancelled.finish(SearchStatus::Cancelled);
    cancelled.finish(SearchStatus::Completed);
    assert_eq!(cancelled.summary(), "(search was cancelled)");

    let mut failed = ResultAggregator::new(&query, 1000);
    failed.finish(SearchStatus::Failed(SearchError::ToolUnavailable {
        exit_code: 127,
    }));
    assert!(failed.summary().starts_with("(search failed: "));
    assert!(failed.status().is_some_and(SearchStatus::is_failure));
}

#[test]
fn summary_names_the_missing_tool() {
    let dir = tempdir().unwrap();
    let query = Query::builder("x", dir.path()).build().unwrap();
    let mut results = ResultAggregator::new(&query, 1000);

    results.finish(SearchStatus::Failed(SearchError::ToolNotFound {
        program: "gfind".to_string(),
    }));

    assert_eq!(
        results.summary(),
        "(search failed: search tool 'gfind' not found)"
    );
}
