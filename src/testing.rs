//! Testing utilities for docstream flows.
//!
//! - **Mock I/O**: [`MemorySink`] captures output, [`FailingSink`] simulates a
//!   client that disconnects or a full disk after N writes
//! - **Pacing**: [`RecordingPacer`] records requested delays without sleeping
//! - **Fixtures**: [`DocFixture`] builds a throwaway document root
//! - **Assertions**: helpers for chunk coverage and JSONL output
//!
//! # Quick Start
//!
//! ```
//! use docstream::testing::*;
//! use docstream::stream_words_with_pacer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fx = DocFixture::new()?.with_document("poema", "hi there\nbye")?;
//! let pacer = RecordingPacer::new();
//! let mut sink = MemorySink::new();
//!
//! stream_words_with_pacer(fx.config(), "poema", &mut sink, pacer.clone())?;
//!
//! assert_eq!(sink.text(), "hi there \nbye \n");
//! assert_eq!(pacer.delays().len(), 5);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;

use crate::pacer::Pacer;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Pacer that records each requested delay and returns immediately.
///
/// Clones share the same record, so keep one handle and give the other to
/// the pipeline.
#[derive(Clone, Debug, Default)]
pub struct RecordingPacer {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of all requested delays.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
    }
}
