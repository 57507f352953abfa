use super::{AggregateRecorder, Record};

/// Buffered recorder.
///
/// Keeps every record in memory, with the steps at which it was flushed.
/// Used for inspecting runs in tests.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    flushed_at: Vec<i64>,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records having the given key.
    pub fn with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.buf.iter().filter(move |r| r.get(key).is_some())
    }

    /// Steps given to [`AggregateRecorder::flush`], in order.
    pub fn flushed_at(&self) -> &[i64] {
        &self.flushed_at
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.buf.push(record);
    }

    fn flush(&mut self, step: i64) {
        self.flushed_at.push(step);
    }
}
