use super::*;

#[derive(Default)]
struct Collector {
    hits: Vec<RawHit>,
    finished: usize,
}

impl RecordSink for Collector {
    fn emit(&mut self, hit: RawHit) {
        self.hits.push(hit);
    }

    fn emit_finished(&mut self) {
        self.finished += 1;
    }
}

const SAMPLE: &[u8] = b"/d/a.txt\x001:FOO\n\
/d/b:c.txt\x0012:key: value\n\
not a record\n\
/d/e.txt\x00x1:bad number\n\
/d/f.txt\x00\xff\xfe:bad number\n\
/d/\xffraw\x007:caf\xc3\xa9 \xff end\n\
/d/z.txt\x0099:last";

fn parse_all(chunks: &[&[u8]]) -> Collector {
    let mut parser = LineParser::new();
    let mut out = Collector::default();
    for chunk in chunks {
        parser.feed(chunk, &mut out);
    }
    parser.flush(&mut out);
    out
}

#[test]
fn parses_well_formed_records() {
    let out = parse_all(&[SAMPLE]);
    assert_eq!(out.hits.len(), 4);

    assert_eq!(out.hits[0], RawHit::new(b"/d/a.txt".to_vec(), 1, "FOO"));
    // 文件名里的冒号不影响切分；文本里的冒号原样保留
    assert_eq!(out.hits[1], RawHit::new(b"/d/b:c.txt".to_vec(), 12, "key: value"));
    assert_eq!(out.hits[2].path, b"/d/\xffraw".to_vec());
    assert_eq!(out.hits[2].line, 7);
    assert_eq!(out.hits[2].text, "caf\u{e9} \u{fffd} end");
    assert_eq!(out.hits[3], RawHit::new(b"/d/z.txt".to_vec(), 99, "last"));
    assert_eq!(out.finished, 1);
}

#[test]
fn chunk_boundaries_do_not_change_output() {
    let whole = parse_all(&[SAMPLE]);

    for split in 0..=SAMPLE.len() {
        let (a, b) = SAMPLE.split_at(split);
        let out = parse_all(&[a, b]);
        assert_eq!(out.hits, whole.hits, "split at {}", split);
    }

    let bytewise: Vec<&[u8]> = SAMPLE.chunks(1).collect();
    assert_eq!(parse_all(&bytewise).hits, whole.hits);

    let odd: Vec<&[u8]> = SAMPLE.chunks(7).collect();
    assert_eq!(parse_all(&odd).hits, whole.hits);
}

#[test]
fn unterminated_tail_is_held_until_flush() {
    let mut parser = LineParser::new();
    let mut out = Collector::default();

    parser.feed(b"/x\x003:partial", &mut out);
    assert!(out.hits.is_empty());
    assert_eq!(parser.buffered(), 12);

    parser.flush(&mut out);
    assert_eq!(out.hits, vec![RawHit::new(b"/x".to_vec(), 3, "partial")]);
    assert_eq!(parser.buffered(), 0);
}

#[test]
fn flush_twice_finishes_once() {
    let mut parser = LineParser::new();
    let mut out = Collector::default();

    parser.feed(b"/x\x001:a", &mut out);
    parser.flush(&mut out);
    parser.flush(&mut out);

    assert_eq!(out.hits.len(), 1);
    assert_eq!(out.finished, 1);
    assert!(parser.is_finished());
}

#[test]
fn malformed_lines_are_dropped() {
    assert!(parse_record(b"no separator at all").is_none());
    assert!(parse_record(b"/x\x00no colon").is_none());
    assert!(parse_record(b"/x\x00:empty number").is_none());
    assert!(parse_record(b"/x\x00+5:signed").is_none());
    assert!(parse_record(b"/x\x00-5:negative").is_none());
    assert!(parse_record(b"/x\x000:zero").is_none());
    assert!(parse_record(b"/x\x0099999999999999999999999:overflow").is_none());
    assert!(parse_record(b"").is_none());
}

#[test]
fn empty_text_and_empty_path_are_kept() {
    assert_eq!(parse_record(b"/x\x005:"), Some(RawHit::new(b"/x".to_vec(), 5, "")));
    assert_eq!(parse_record(b"\x005:t"), Some(RawHit::new(Vec::new(), 5, "t")));
}

#[test]
fn resynchronizes_after_garbage() {
    let out = parse_all(&[b"\x00\x00::\n\xff\xff\n/ok\x002:fine\n"]);
    assert_eq!(out.hits, vec![RawHit::new(b"/ok".to_vec(), 2, "fine")]);
}

#[test]
fn empty_feed_is_a_no_op() {
    let mut parser = LineParser::new();
    let mut out = Collector::default();
    parser.feed(b"", &mut out);
    assert_eq!(parser.buffered(), 0);
    assert!(out.hits.is_empty());
    assert_eq!(out.finished, 0);
}
