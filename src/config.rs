//! Runtime configuration for the streaming flows.
//!
//! All fields have defaults matching the behaviour clients expect: documents
//! live under `./doc` as `<name>.txt`, chunks are 16 KiB, and word-paced
//! output pauses 80 ms after every word and line break.
//!
//! ```no_run
//! use docstream::StreamConfig;
//! # fn main() -> anyhow::Result<()> {
//! let config = StreamConfig::from_json_file("docstream.json")?;
//! assert!(config.buffer_size > 0);
//! # Ok(())
//! # }
//! ```

use crate::error::StreamError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default read buffer: 16 KiB per chunk.
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Default typing delay between emitted words and line breaks.
pub const DEFAULT_WORD_DELAY_MS: u64 = 80;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Directory that document names are resolved against.
    pub doc_root: PathBuf,
    /// Extension appended to document names (without the dot).
    pub extension: String,
    /// Upper bound, in bytes, of a single chunk.
    pub buffer_size: usize,
    /// Pause after each word and line break in word-paced streams.
    pub word_delay_ms: u64,
    /// Number of chunks a [`ChannelSink`](crate::ChannelSink) may hold before
    /// the producer blocks.
    pub channel_capacity: usize,
    /// Field delimiter for CSV inputs.
    pub csv_delimiter: char,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            doc_root: PathBuf::from("./doc"),
            extension: "txt".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            word_delay_ms: DEFAULT_WORD_DELAY_MS,
            channel_capacity: 4,
            csv_delimiter: ',',
        }
    }
}

impl StreamConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults; the result is validated before it is returned.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, is not valid JSON for
    /// this type, or fails [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validate config {}", path.display()))?;
        Ok(config)
    }

    /// Check invariants the flows rely on.
    ///
    /// # Errors
    /// Returns [`StreamError::Config`] describing the first violated rule.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.buffer_size == 0 {
            return Err(StreamError::Config("buffer_size must be greater than zero".into()));
        }
        if self.channel_capacity == 0 {
            return Err(StreamError::Config(
                "channel_capacity must be greater than zero".into(),
            ));
        }
        if self.extension.is_empty() || self.extension.contains(['/', '\\', '.']) {
            return Err(StreamError::Config(format!(
                "extension {:?} must be a bare, non-empty suffix",
                self.extension
            )));
        }
        if !self.csv_delimiter.is_ascii() {
            return Err(StreamError::Config("csv_delimiter must be a single ASCII character".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn word_delay(&self) -> Duration {
        Duration::from_millis(self.word_delay_ms)
    }

    #[must_use]
    pub fn with_doc_root(mut self, doc_root: impl Into<PathBuf>) -> Self {
        self.doc_root = doc_root.into();
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use]
    pub fn with_word_delay(mut self, delay: Duration) -> Self {
        self.word_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
