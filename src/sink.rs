//! Append-only output destinations.
//!
//! A [`Sink`] accepts bytes in order and is told once, via
//! [`finish`](Sink::finish), that no more are coming. Writes block until the
//! destination has accepted the bytes, which is what keeps a pipeline from
//! reading ahead of a slow consumer.
//!
//! - [`WriterSink`] wraps any `Write` (an HTTP response body, stdout, a socket)
//!   and flushes after every write so a client sees output as it is produced.
//! - [`ChannelSink`] hands chunks to another thread over a bounded channel; the
//!   receiving half is typically adapted into an async response body.
//! - [`FileSink`] writes to a file that is only created once output (or a
//!   successful finish) actually happens.

use crate::config::StreamConfig;
use crate::error::StreamError;
use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender};

/// Response headers for event-stream endpoints. Callers set these once,
/// before the first write.
pub const EVENT_STREAM_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Content-Type", "text/event-stream; charset=utf-8"),
    ("Cache-Control", "no-cache"),
    ("Connection", "keep-alive"),
];

pub trait Sink {
    /// Short label used in errors and logs.
    fn name(&self) -> &str;

    /// Append `bytes`. Returns once the destination has taken them.
    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError>;

    /// Drain buffered output and signal end-of-stream.
    fn finish(&mut self) -> Result<(), StreamError>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        (**self).write_chunk(bytes)
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        (**self).finish()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        (**self).write_chunk(bytes)
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        (**self).finish()
    }
}

// --------- Writer ----------

/// Sink over any [`Write`], flushed after every chunk.
pub struct WriterSink<W: Write> {
    writer: W,
    label: String,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn name(&self) -> &str {
        &self.label
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.writer
            .write_all(bytes)
            .and_then(|()| self.writer.flush())
            .map_err(|e| StreamError::sink(&self.label, e))
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        self.writer
            .flush()
            .map_err(|e| StreamError::sink(&self.label, e))
    }
}

// --------- Channel ----------

/// Sink that sends each chunk over a bounded channel.
///
/// With capacity `n`, at most `n` chunks wait in the channel; further writes
/// block until the receiver catches up. Dropping the receiver is treated as a
/// client disconnect and fails the next write with `BrokenPipe`. Finishing
/// drops the sender, which ends the receiver's iteration.
pub struct ChannelSink {
    tx: Option<SyncSender<Vec<u8>>>,
    label: String,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::sync_channel(capacity);
        let sink = Self {
            tx: Some(tx),
            label: "channel".to_string(),
        };
        (sink, rx)
    }

    /// [`bounded`](Self::bounded) with `config.channel_capacity` slots, so at
    /// most `channel_capacity × buffer_size` bytes wait for the consumer.
    #[must_use]
    pub fn from_config(config: &StreamConfig) -> (Self, Receiver<Vec<u8>>) {
        Self::bounded(config.channel_capacity)
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl Sink for ChannelSink {
    fn name(&self) -> &str {
        &self.label
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        let Some(tx) = &self.tx else {
            return Err(StreamError::sink(
                &self.label,
                io::Error::new(io::ErrorKind::BrokenPipe, "write after end of stream"),
            ));
        };
        tx.send(bytes.to_vec()).map_err(|_| {
            StreamError::sink(
                &self.label,
                io::Error::new(io::ErrorKind::BrokenPipe, "receiver disconnected"),
            )
        })
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        self.tx = None;
        Ok(())
    }
}

// --------- File ----------

/// Buffered file sink, truncating any existing file.
///
/// The file (and missing parent directories) is created on the first write or
/// on [`finish`](Sink::finish), so a run that fails before producing output
/// leaves nothing behind. Finishing flushes and syncs to disk.
///
/// A sink dropped without finishing (an aborted run) still flushes what it
/// buffered, but does not sync; a failed flush is logged at `warn`.
pub struct FileSink {
    path: PathBuf,
    label: String,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self {
            path,
            label,
            writer: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, StreamError> {
        if self.writer.is_none() {
            let f = create_file(&self.path).map_err(|e| StreamError::sink(&self.label, e))?;
            tracing::debug!(path = %self.path.display(), "created output file");
            self.writer = Some(BufWriter::new(f));
        }
        self.writer.as_mut().ok_or_else(|| {
            StreamError::sink(&self.label, io::Error::other("output file unavailable"))
        })
    }
}

fn create_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    File::create(path)
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.label
    }

    fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        let w = self.writer()?;
        w.write_all(bytes)
            .map_err(|e| StreamError::sink(self.label.as_str(), e))
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        let label = self.label.clone();
        let w = self.writer()?;
        w.flush()
            .and_then(|()| w.get_ref().sync_all())
            .map_err(|e| StreamError::sink(label, e))
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(w) = self.writer.as_mut()
            && let Err(e) = w.flush()
        {
            tracing::warn!(path = %self.path.display(), error = %e, "output not fully drained");
        }
    }
}
