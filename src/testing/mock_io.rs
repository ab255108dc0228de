//! In-memory sinks for exercising pipelines without sockets or files.

use crate::error::StreamError;
use crate::sink::Sink;
use std::io;

/// Sink that keeps every write in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Vec<Vec<u8>>,
    finished: bool,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Each write, in order, exactly as received.
    #[must_use]
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// All writes concatenated.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// All writes concatenated, decoded lossily as UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Whether [`Sink::finish`] was called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        if self.finished {
            return Err(StreamError::sink(
                "memory",
                io::Error::new(io::ErrorKind::BrokenPipe, "write after finish"),
            ));
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        self.finished = true;
        Ok(())
    }
}

/// Sink that accepts `n` writes and fails every write after that.
///
/// Use `BrokenPipe` to simulate a client disconnect and `StorageFull` (or
/// `Other`) to simulate a full disk.
#[derive(Debug)]
pub struct FailingSink {
    inner: MemorySink,
    remaining: usize,
    kind: io::ErrorKind,
    fail_finish: bool,
}

impl FailingSink {
    #[must_use]
    pub fn after(n: usize, kind: io::ErrorKind) -> Self {
        Self {
            inner: MemorySink::new(),
            remaining: n,
            kind,
            fail_finish: false,
        }
    }

    /// Accept every write but fail when the output is drained.
    #[must_use]
    pub fn on_finish(kind: io::ErrorKind) -> Self {
        Self {
            inner: MemorySink::new(),
            remaining: usize::MAX,
            kind,
            fail_finish: true,
        }
    }

    /// Writes accepted before the failure.
    #[must_use]
    pub fn accepted(&self) -> &MemorySink {
        &self.inner
    }
}

impl Sink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        if self.remaining == 0 {
            return Err(StreamError::sink("failing", io::Error::from(self.kind)));
        }
        self.remaining -= 1;
        self.inner.write_chunk(bytes)
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        if self.fail_finish {
            return Err(StreamError::sink("failing", io::Error::from(self.kind)));
        }
        self.inner.finish()
    }
}
