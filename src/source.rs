//! Bounded-memory chunk source.
//!
//! A [`ChunkSource`] reads a text file forward in chunks of at most
//! `buffer_size` bytes. It is lazy: nothing is opened until the first chunk is
//! requested, and only one chunk is ever held at a time. Dropping the source
//! closes the file.
//!
//! Chunks always hold whole UTF-8 characters. When a read ends in the middle of
//! a multi-byte sequence, the partial bytes are carried into the next chunk
//! instead of being split.

use crate::error::StreamError;
use crate::io::compression::{decoding_reader, DynRead};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Smallest usable buffer; one UTF-8 scalar must always fit.
pub const MIN_BUFFER_SIZE: usize = 4;

/// An immutable piece of a document, in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    text: String,
    offset: u64,
}

impl Chunk {
    #[must_use]
    pub fn new(text: impl Into<String>, offset: u64) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of this chunk within the (decoded) document.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

enum State {
    Pending,
    Open(DynRead),
    Done,
}

/// Lazy, forward-only sequence of non-empty [`Chunk`]s read from a file.
///
/// Iteration yields `Err` at most once; the source is exhausted afterwards.
/// A missing file surfaces as [`StreamError::SourceNotFound`] from the first
/// call to `next()`.
pub struct ChunkSource {
    path: PathBuf,
    buffer_size: usize,
    state: State,
    carry: Vec<u8>,
    offset: u64,
}

impl ChunkSource {
    /// Describe a source without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, buffer_size: usize) -> Self {
        Self {
            path: path.into(),
            buffer_size: buffer_size.max(MIN_BUFFER_SIZE),
            state: State::Pending,
            carry: Vec::new(),
            offset: 0,
        }
    }

    /// Open the file immediately so a missing source fails before the caller
    /// commits to any output.
    ///
    /// # Errors
    /// [`StreamError::SourceNotFound`] if the file does not exist,
    /// [`StreamError::SourceRead`] for any other open failure.
    pub fn open(path: impl Into<PathBuf>, buffer_size: usize) -> Result<Self, StreamError> {
        let mut source = Self::new(path, buffer_size);
        let reader = open_reader(&source.path)?;
        source.state = State::Open(reader);
        Ok(source)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn read_chunk(&mut self) -> Result<Option<Chunk>, StreamError> {
        if matches!(self.state, State::Pending) {
            self.state = State::Open(open_reader(&self.path)?);
        }
        let State::Open(reader) = &mut self.state else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.buffer_size];
        let mut filled = self.carry.len();
        buf[..filled].copy_from_slice(&self.carry);
        self.carry.clear();

        let mut eof = false;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    eof = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(StreamError::from_source_io(&self.path, e)),
            }
        }
        buf.truncate(filled);

        if let Err(e) = std::str::from_utf8(&buf) {
            let valid = e.valid_up_to();
            if e.error_len().is_some() || eof {
                return Err(StreamError::SourceRead {
                    path: self.path.clone(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid UTF-8 at byte {}", self.offset + valid as u64),
                    ),
                });
            }
            self.carry.extend_from_slice(&buf[valid..]);
            buf.truncate(valid);
        }

        if eof {
            self.state = State::Done;
        }
        if buf.is_empty() {
            return Ok(None);
        }

        let text = String::from_utf8(buf).map_err(|e| StreamError::SourceRead {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        let chunk = Chunk::new(text, self.offset);
        self.offset += chunk.len() as u64;
        Ok(Some(chunk))
    }
}

fn open_reader(path: &Path) -> Result<DynRead, StreamError> {
    let file = File::open(path).map_err(|e| StreamError::from_source_io(path, e))?;
    tracing::debug!(path = %path.display(), "opened chunk source");
    decoding_reader(file, path).map_err(|e| StreamError::from_source_io(path, e))
}

impl Iterator for ChunkSource {
    type Item = Result<Chunk, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.state = State::Done;
                None
            }
            Err(e) => {
                self.state = State::Done;
                self.carry.clear();
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for ChunkSource {}

impl std::fmt::Debug for ChunkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Pending => "pending",
            State::Open(_) => "open",
            State::Done => "done",
        };
        f.debug_struct("ChunkSource")
            .field("path", &self.path)
            .field("buffer_size", &self.buffer_size)
            .field("state", &state)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;

    fn collect(source: ChunkSource) -> Vec<Chunk> {
        source.collect::<Result<Vec<_>, _>>().expect("read chunks")
    }

    #[test]
    fn chunk_count_is_ceil_of_size_over_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let body = "0123456789".repeat(10); // 100 bytes
        fs::write(&path, &body).unwrap();

        let chunks = collect(ChunkSource::new(&path, 16));
        assert_eq!(chunks.len(), 7);
        assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= 16));
        let joined: String = chunks.iter().map(Chunk::as_str).collect();
        assert_eq!(joined, body);
        assert_eq!(chunks[1].offset(), 16);
    }

    #[test]
    fn multibyte_characters_are_not_split() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poema.txt");
        // "ã" and "ç" are two bytes; with a 5-byte buffer boundaries land mid-char.
        let body = "ãaçãoçã eé";
        fs::write(&path, body).unwrap();

        let chunks = collect(ChunkSource::new(&path, 5));
        assert!(chunks.iter().all(|c| c.len() <= 5 && !c.is_empty()));
        let joined: String = chunks.iter().map(Chunk::as_str).collect();
        assert_eq!(joined, body);
    }

    #[test]
    fn empty_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();
        assert!(collect(ChunkSource::new(&path, 8)).is_empty());
    }

    #[test]
    fn missing_file_fails_on_first_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ChunkSource::new(dir.path().join("nope.txt"), 8);
        let err = source.next().expect("one item").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
        assert!(source.next().is_none());
    }

    #[test]
    fn eager_open_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChunkSource::open(dir.path().join("nope.txt"), 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[test]
    fn invalid_utf8_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();
        let results: Vec<_> = ChunkSource::new(&path, 16).collect();
        assert_eq!(results.len(), 1);
        let err = results.into_iter().next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }

    #[test]
    fn truncated_character_at_eof_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.txt");
        fs::write(&path, [b'a', 0xc3]).unwrap();
        let err = ChunkSource::new(&path, 16).find_map(Result::err).expect("error");
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }

    #[test]
    fn tiny_buffers_are_clamped() {
        assert_eq!(ChunkSource::new("x", 1).buffer_size(), MIN_BUFFER_SIZE);
    }
}
