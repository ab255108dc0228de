//! Error taxonomy shared by sources, sinks and the pipeline.
//!
//! Every failure aborts the current run and is surfaced to the caller as a
//! [`StreamError`]. Nothing is retried and nothing already written is rolled
//! back.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fieldless discriminant of a [`StreamError`], convenient for matching in
/// callers that map failures to status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SourceNotFound,
    SourceRead,
    SinkWrite,
    Parse,
    InvalidDocument,
    Config,
}

/// Failure of a streaming run.
#[derive(Debug, Error)]
pub enum StreamError {
    // ── Source ───────────────────────────────────────────────────────────────
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("read failed on {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error in {} at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("invalid document name {name:?}")]
    InvalidDocument { name: String },

    // ── Sink ─────────────────────────────────────────────────────────────────
    #[error("write to {target} failed: {source}")]
    SinkWrite {
        target: String,
        #[source]
        source: io::Error,
    },

    // ── Configuration ────────────────────────────────────────────────────────
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StreamError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::SourceRead { .. } => ErrorKind::SourceRead,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::InvalidDocument { .. } => ErrorKind::InvalidDocument,
            Self::SinkWrite { .. } => ErrorKind::SinkWrite,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Classify an I/O error raised while opening or reading `path`.
    ///
    /// `NotFound` becomes [`StreamError::SourceNotFound`]; everything else is a
    /// read failure.
    pub(crate) fn from_source_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        if err.kind() == io::ErrorKind::NotFound {
            Self::SourceNotFound { path }
        } else {
            Self::SourceRead { path, source: err }
        }
    }

    pub(crate) fn sink(target: impl Into<String>, err: io::Error) -> Self {
        Self::SinkWrite {
            target: target.into(),
            source: err,
        }
    }

    /// True when the sink reported that the consumer went away.
    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            Self::SinkWrite { source, .. }
                if matches!(
                    source.kind(),
                    io::ErrorKind::BrokenPipe
                        | io::ErrorKind::ConnectionReset
                        | io::ErrorKind::ConnectionAborted
                )
        )
    }
}
