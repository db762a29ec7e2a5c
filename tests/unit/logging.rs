use super::*;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Vec<u8>>>);

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Shared {
    type Writer = Shared;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn file_writer_receives_every_line() {
    for verbose in [false, true] {
        let file = Shared::default();
        let writer = log_writer(file.clone(), verbose);

        writer.make_writer().write_all(b"search started\n").unwrap();

        assert_eq!(file.0.lock().unwrap().as_slice(), b"search started\n");
    }
}
