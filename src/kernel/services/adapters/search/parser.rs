//! 增量行解析
//!
//! 管道输出格式：`<file>\0<lineno>:<text>\n`。字节按任意大小分片到达，
//! 解析器缓存不完整的行，遇到换行才解析。不符合格式的行直接丢弃，
//! 下一个换行处自动重新同步。

use crate::kernel::services::ports::RawHit;
use memchr::memchr;

/// 解析结果的接收方
pub trait RecordSink {
    fn emit(&mut self, hit: RawHit);
    fn emit_finished(&mut self);
}

#[derive(Debug, Default)]
pub struct LineParser {
    buf: Vec<u8>,
    finished: bool,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前缓存的未完成行字节数
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn feed<S: RecordSink + ?Sized>(&mut self, bytes: &[u8], sink: &mut S) {
        if bytes.is_empty() {
            return;
        }

        // 只扫描新到达的字节，旧的缓存里已确认没有换行
        let mut scan_from = self.buf.len();
        self.buf.extend_from_slice(bytes);

        let mut consumed = 0usize;
        while let Some(pos) = memchr(b'\n', &self.buf[scan_from..]) {
            let end = scan_from + pos;
            if let Some(hit) = parse_record(&self.buf[consumed..end]) {
                sink.emit(hit);
            }
            consumed = end + 1;
            scan_from = consumed;
        }

        if consumed > 0 {
            self.buf.drain(..consumed);
        }
    }

    /// 把残留的半行当作完整记录处理，然后发出一次结束信号
    pub fn flush<S: RecordSink + ?Sized>(&mut self, sink: &mut S) {
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            if let Some(hit) = parse_record(&rest) {
                sink.emit(hit);
            }
        }

        if !self.finished {
            self.finished = true;
            sink.emit_finished();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// 解析一条不含结尾换行的记录
pub fn parse_record(line: &[u8]) -> Option<RawHit> {
    let nul = memchr(0, line)?;
    let (path, rest) = (&line[..nul], &line[nul + 1..]);

    let colon = memchr(b':', rest)?;
    let (number, text) = (&rest[..colon], &rest[colon + 1..]);

    let line_no = parse_line_number(number)?;
    Some(RawHit {
        path: path.to_vec(),
        line: line_no,
        text: String::from_utf8_lossy(text).into_owned(),
    })
}

/// 只接受纯 ASCII 数字；行号从 1 开始，0 视为格式错误
fn parse_line_number(digits: &[u8]) -> Option<u64> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let mut n: u64 = 0;
    for &d in digits {
        n = n.checked_mul(10)?.checked_add(u64::from(d - b'0'))?;
    }
    (n >= 1).then_some(n)
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/parser.rs"]
mod tests;
