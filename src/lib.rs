//! # docstream
//!
//! Bounded-memory streaming of document files to a client, with optional
//! word-by-word pacing, and a CSV-to-JSON-Lines filter.
//!
//! ## Key Features
//!
//! - **Chunked reads** - files are read in fixed-size chunks (16 KiB by default),
//!   so memory use never depends on file size
//! - **One pipeline, three flows** - pass-through, word-paced and
//!   filter-transform share a single [`Pipeline`] run loop
//! - **Typing effect** - word-paced output pauses exactly 80 ms after every word
//!   and line break by default
//! - **Backpressure** - sinks block until output is accepted; [`ChannelSink`]
//!   bounds how far a producer can run ahead of a slow client
//! - **Clean failure** - source and sink errors abort the run, surface as a
//!   typed [`StreamError`], and release the open file
//! - **Compressed inputs** - `.gz` and `.zst` sources are decoded transparently
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstream::*;
//! # fn main() -> anyhow::Result<()> {
//! let config = StreamConfig::default();
//!
//! // Typing effect for ./doc/poema.txt, written to any `Write`.
//! let mut out = WriterSink::new(std::io::stdout(), "stdout");
//! stream_words(&config, "poema", &mut out)?;
//!
//! // Raw chunks of ./doc/log.txt.
//! stream_raw(&config, "log", &mut out)?;
//!
//! // Rows where favorite_os == "macos", as JSON Lines.
//! let summary = filter_csv_to_jsonl(
//!     &config,
//!     "doc/users.csv",
//!     "out/macos.jsonl",
//!     FieldFilter::equals("favorite_os", "macos"),
//! )?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Sources
//!
//! A [`ChunkSource`] yields [`Chunk`]s of a text file in order; a
//! [`CsvRecordSource`] yields [`CsvRecord`]s of a delimited file. Both are
//! plain iterators over `Result<_, StreamError>`, pulled one item at a time.
//! [`Words`] adapts a chunk stream into word and line-break [`Token`]s.
//!
//! ### Pipeline
//!
//! A [`Pipeline`] filters, renders and emits records to a [`Sink`], pausing
//! through a [`Pacer`] when configured. It always finishes the sink before
//! reporting success and returns a [`RunSummary`].
//!
//! ### Sinks
//!
//! - [`WriterSink`] - any `Write`, flushed per chunk
//! - [`ChannelSink`] - bounded hand-off to another thread
//! - [`FileSink`] - lazily created, synced on finish
//!
//! HTTP callers set [`EVENT_STREAM_HEADERS`] before streaming.
//!
//! ## Feature Flags
//!
//! - `compression-gzip` (default) - decode `.gz` sources
//! - `compression-zstd` (default) - decode `.zst` sources
//! - `compression-bzip2` - decode `.bz2` sources
//! - `compression-xz` - decode `.xz` sources
//!
//! ## Module Overview
//!
//! - [`source`] - chunked file reads
//! - [`tokens`] - word/line-break tokenization
//! - [`pipeline`] - the run loop
//! - [`sink`] - output destinations
//! - [`flows`] - the three document flows
//! - [`io`] - CSV, JSON Lines and compression plumbing
//! - [`testing`] - doubles and fixtures for tests

pub mod config;
pub mod error;
pub mod filter;
pub mod flows;
pub mod io;
pub mod metrics;
pub mod pacer;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod testing;
pub mod tokens;

pub use config::{StreamConfig, DEFAULT_BUFFER_SIZE, DEFAULT_WORD_DELAY_MS};
pub use error::{ErrorKind, StreamError};
pub use filter::FieldFilter;
pub use flows::{filter_csv_to_jsonl, resolve_document, stream_raw, stream_words, stream_words_with_pacer};
pub use io::csv::{CsvRecord, CsvRecordSource};
pub use io::jsonl::read_jsonl_vec;
pub use metrics::RunSummary;
pub use pacer::{Pacer, SleepPacer};
pub use pipeline::{Pipeline, PipelineKind};
pub use sink::{ChannelSink, FileSink, Sink, WriterSink, EVENT_STREAM_HEADERS};
pub use source::{Chunk, ChunkSource};
pub use tokens::{words, Token, Words};
