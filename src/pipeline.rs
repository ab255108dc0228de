//! The record pipeline: filter, transform, emit, optionally paced.
//!
//! One [`Pipeline`] type covers every flow. A pipeline owns an optional
//! filter, a transform that renders a record into bytes, and an optional
//! pacing delay. [`run`](Pipeline::run) pulls records one at a time, so the
//! only data alive at any point is the current record and its rendering.
//!
//! The three flows are constructors over different record types:
//!
//! | constructor                          | record       | filter | pacing |
//! |--------------------------------------|--------------|--------|--------|
//! | [`Pipeline::pass_through`]           | [`Chunk`]    | no     | no     |
//! | [`Pipeline::word_paced`]             | [`Token`]    | no     | yes    |
//! | [`Pipeline::filter_transform`]       | [`CsvRecord`]| yes    | no     |
//!
//! Any failure, from the source or the sink, aborts the run immediately and
//! is returned as-is. Output already handed to the sink stays there.

use crate::error::StreamError;
use crate::filter::FieldFilter;
use crate::io::csv::CsvRecord;
use crate::io::jsonl::encode_line;
use crate::metrics::RunSummary;
use crate::pacer::{Pacer, SleepPacer};
use crate::sink::Sink;
use crate::source::Chunk;
use crate::tokens::Token;
use serde::Serialize;
use std::fmt;
use std::io;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    PassThrough,
    WordPaced,
    FilterTransform,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PassThrough => "pass-through",
            Self::WordPaced => "word-paced",
            Self::FilterTransform => "filter-transform",
        })
    }
}

type Predicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;
type Transform<R> = Box<dyn Fn(&R, &mut Vec<u8>) -> io::Result<()> + Send + Sync>;

pub struct Pipeline<R> {
    kind: PipelineKind,
    filter: Option<Predicate<R>>,
    transform: Transform<R>,
    pacing: Option<Duration>,
    pacer: Box<dyn Pacer>,
}

impl Pipeline<Chunk> {
    /// Forward chunks unchanged, as fast as the sink accepts them.
    #[must_use]
    pub fn pass_through() -> Self {
        Self::from_parts(PipelineKind::PassThrough, |chunk: &Chunk, out| {
            out.extend_from_slice(chunk.as_bytes());
            Ok(())
        })
    }
}

impl Pipeline<Token> {
    /// Emit `"<word> "` / `"\n"` tokens, pausing `delay` after each one.
    #[must_use]
    pub fn word_paced(delay: Duration) -> Self {
        Self::from_parts(PipelineKind::WordPaced, |token: &Token, out| {
            token.render_into(out);
            Ok(())
        })
        .with_pacing(delay)
    }
}

impl Pipeline<CsvRecord> {
    /// Keep rows matching `filter` and render each as one JSONL line.
    #[must_use]
    pub fn filter_transform(filter: FieldFilter) -> Self {
        tracing::trace!(%filter, "building filter-transform pipeline");
        Self::from_parts(PipelineKind::FilterTransform, |record: &CsvRecord, out| {
            encode_line(record, out)
        })
        .with_filter(move |record| filter.test(record))
    }
}

impl<R> Pipeline<R> {
    /// Build a pipeline from a kind tag and a transform. No filter, no pacing.
    pub fn from_parts<F>(kind: PipelineKind, transform: F) -> Self
    where
        F: Fn(&R, &mut Vec<u8>) -> io::Result<()> + Send + Sync + 'static,
    {
        Self {
            kind,
            filter: None,
            transform: Box::new(transform),
            pacing: None,
            pacer: Box::new(SleepPacer),
        }
    }

    /// Drop records for which `predicate` is false. Evaluated once per record,
    /// in arrival order.
    #[must_use]
    pub fn with_filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Pause `delay` after every emitted record.
    #[must_use]
    pub fn with_pacing(mut self, delay: Duration) -> Self {
        self.pacing = Some(delay);
        self
    }

    /// Replace the default thread-sleeping pacer.
    #[must_use]
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    #[must_use]
    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    #[must_use]
    pub fn pacing(&self) -> Option<Duration> {
        self.pacing
    }

    /// Drain `records` into `sink`, then finish the sink.
    ///
    /// Returns only after the sink has acknowledged [`Sink::finish`], so a
    /// caller reporting success never races buffered output. The record
    /// iterator is dropped on every exit path, which closes the underlying
    /// file.
    ///
    /// # Errors
    /// The first source or sink error, unchanged. A transform failure is
    /// reported as a [`StreamError::SinkWrite`] against the sink.
    pub fn run<I, S>(&mut self, records: I, sink: &mut S) -> Result<RunSummary, StreamError>
    where
        I: IntoIterator<Item = Result<R, StreamError>>,
        S: Sink + ?Sized,
    {
        let started = Instant::now();
        let mut summary = RunSummary::new(self.kind);
        tracing::debug!(kind = %self.kind, sink = sink.name(), "pipeline started");

        let outcome = self.drive(records.into_iter(), sink, &mut summary);
        summary.elapsed = started.elapsed();

        match outcome {
            Ok(()) => {
                tracing::debug!(
                    kind = %self.kind,
                    records_read = summary.records_read,
                    records_emitted = summary.records_emitted,
                    bytes = summary.bytes_written,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "pipeline finished"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(
                    kind = %self.kind,
                    sink = sink.name(),
                    records_emitted = summary.records_emitted,
                    error = %e,
                    "pipeline aborted"
                );
                Err(e)
            }
        }
    }

    fn drive<I, S>(
        &mut self,
        records: I,
        sink: &mut S,
        summary: &mut RunSummary,
    ) -> Result<(), StreamError>
    where
        I: Iterator<Item = Result<R, StreamError>>,
        S: Sink + ?Sized,
    {
        let mut buf = Vec::new();
        for item in records {
            let record = item?;
            summary.records_read += 1;

            if let Some(keep) = &self.filter
                && !keep(&record)
            {
                summary.records_dropped += 1;
                continue;
            }

            buf.clear();
            (self.transform)(&record, &mut buf).map_err(|e| StreamError::sink(sink.name(), e))?;
            if buf.is_empty() {
                continue;
            }

            sink.write_chunk(&buf)?;
            summary.records_emitted += 1;
            summary.bytes_written += buf.len() as u64;

            if let Some(delay) = self.pacing {
                self.pacer.pause(delay);
                summary.pauses += 1;
            }
        }
        sink.finish()
    }
}

impl<R> fmt::Debug for Pipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("kind", &self.kind)
            .field("filtered", &self.filter.is_some())
            .field("pacing", &self.pacing)
            .finish_non_exhaustive()
    }
}
