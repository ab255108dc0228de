//! The three document flows, wired against a [`StreamConfig`].
//!
//! - [`stream_words`]: typing effect, one word at a time with a pause after
//!   each word and line break.
//! - [`stream_raw`]: chunks straight through, for tailing logs.
//! - [`filter_csv_to_jsonl`]: keep CSV rows matching a [`FieldFilter`] and
//!   write them as JSON Lines.
//!
//! The streaming flows resolve a document *name* under `doc_root`; the caller
//! is expected to have set [`EVENT_STREAM_HEADERS`](crate::EVENT_STREAM_HEADERS)
//! before handing over its response body as the sink. Every flow opens its
//! source before the first byte reaches the sink, so a missing document fails
//! with nothing written.

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::filter::FieldFilter;
use crate::io::csv::CsvRecordSource;
use crate::metrics::RunSummary;
use crate::pacer::{Pacer, SleepPacer};
use crate::pipeline::Pipeline;
use crate::sink::{FileSink, Sink};
use crate::source::ChunkSource;
use crate::tokens::Words;
use std::path::{Component, Path, PathBuf};

/// Map a document name to `<doc_root>/<name>.<extension>`.
///
/// Names must be a single normal path component; anything that could step
/// outside `doc_root` is rejected.
///
/// # Errors
/// [`StreamError::InvalidDocument`] for empty names, separators, `.` or `..`.
pub fn resolve_document(config: &StreamConfig, name: &str) -> Result<PathBuf, StreamError> {
    let invalid = || StreamError::InvalidDocument {
        name: name.to_string(),
    };
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => return Err(invalid()),
    }
    Ok(config
        .doc_root
        .join(format!("{name}.{}", config.extension)))
}

/// Stream document `name` word by word, sleeping between tokens.
///
/// # Errors
/// See [`stream_words_with_pacer`].
pub fn stream_words<S: Sink + ?Sized>(
    config: &StreamConfig,
    name: &str,
    sink: &mut S,
) -> Result<RunSummary, StreamError> {
    stream_words_with_pacer(config, name, sink, SleepPacer)
}

/// Stream document `name` word by word, pausing through `pacer`.
///
/// # Errors
/// [`StreamError::InvalidDocument`] or [`StreamError::SourceNotFound`] before
/// anything is written; afterwards any source or sink error, at which point
/// the sink holds a truncated stream.
pub fn stream_words_with_pacer<S, P>(
    config: &StreamConfig,
    name: &str,
    sink: &mut S,
    pacer: P,
) -> Result<RunSummary, StreamError>
where
    S: Sink + ?Sized,
    P: Pacer + 'static,
{
    config.validate()?;
    let path = resolve_document(config, name)?;
    let source = ChunkSource::open(path, config.buffer_size)?;
    let tokens = Words::new(source, config.buffer_size);
    Pipeline::word_paced(config.word_delay())
        .with_pacer(pacer)
        .run(tokens, sink)
}

/// Stream document `name` chunk by chunk, unmodified and unpaced.
///
/// # Errors
/// Same as [`stream_words_with_pacer`].
pub fn stream_raw<S: Sink + ?Sized>(
    config: &StreamConfig,
    name: &str,
    sink: &mut S,
) -> Result<RunSummary, StreamError> {
    config.validate()?;
    let path = resolve_document(config, name)?;
    let source = ChunkSource::open(path, config.buffer_size)?;
    Pipeline::pass_through().run(source, sink)
}

/// Write the rows of `input` that pass `filter` to `output` as JSON Lines.
///
/// `output` is truncated if it exists. It is only created once the input has
/// been opened, so a missing input leaves no output file. Returns after the
/// output has been flushed and synced.
///
/// # Errors
/// [`StreamError::SourceNotFound`] / [`StreamError::SourceRead`] for the
/// input, [`StreamError::Parse`] for a malformed row (rows before it remain
/// written), [`StreamError::SinkWrite`] for the output.
pub fn filter_csv_to_jsonl(
    config: &StreamConfig,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    filter: FieldFilter,
) -> Result<RunSummary, StreamError> {
    config.validate()?;
    let delimiter = u8::try_from(config.csv_delimiter)
        .map_err(|_| StreamError::Config("csv_delimiter must be a single ASCII character".into()))?;
    let records = CsvRecordSource::open(input.as_ref(), delimiter)?;
    let mut sink = FileSink::new(output.as_ref());
    Pipeline::filter_transform(filter).run(records, &mut sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn resolves_under_doc_root_with_extension() {
        let config = StreamConfig::default().with_doc_root("/srv/doc");
        assert_eq!(
            resolve_document(&config, "poema").unwrap(),
            PathBuf::from("/srv/doc/poema.txt")
        );
    }

    #[test]
    fn rejects_names_that_escape_the_root() {
        let config = StreamConfig::default();
        for bad in ["", "..", ".", "../etc/passwd", "a/b", "a\\b", "/abs"] {
            let err = resolve_document(&config, bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDocument, "{bad:?}");
        }
    }

    #[test]
    fn dotted_names_are_allowed() {
        let config = StreamConfig::default().with_doc_root("doc");
        assert_eq!(
            resolve_document(&config, "release.notes").unwrap(),
            PathBuf::from("doc/release.notes.txt")
        );
    }
}
