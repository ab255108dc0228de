//! Streaming CSV record source.
//!
//! [`CsvRecordSource`] reads a delimited file with a header row and yields one
//! [`CsvRecord`] per data row, in file order, without buffering the file.
//!
//! # Design notes
//! - Column counts are strict: a row whose length differs from the header is a
//!   [`StreamError::Parse`] carrying the 1-based line number.
//! - Duplicate header names are rejected up front; a record serializes to a
//!   JSON object and duplicate keys would silently shadow each other.
//! - Values are kept as strings; no type inference is performed.

use crate::error::StreamError;
use crate::io::compression::{decoding_reader, DynRead};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One data row: column name → field value, in header order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRecord {
    headers: Arc<[String]>,
    values: Vec<String>,
    line: u64,
}

impl CsvRecord {
    /// Build a record from parallel header/value lists. Callers guarantee
    /// equal lengths; the reader enforces it with strict column counts.
    #[must_use]
    pub(crate) fn new(headers: Arc<[String]>, values: Vec<String>, line: u64) -> Self {
        assert_eq!(headers.len(), values.len(), "header/value length mismatch");
        Self {
            headers,
            values,
            line,
        }
    }

    /// Value of the named column, if the header has it.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == field)
            .map(|i| self.values[i].as_str())
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 1-based line of the row in the source file.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.line
    }
}

impl Serialize for CsvRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Lazy iterator over the rows of a CSV file.
pub struct CsvRecordSource {
    path: PathBuf,
    headers: Arc<[String]>,
    reader: csv::Reader<DynRead>,
    done: bool,
}

impl std::fmt::Debug for CsvRecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRecordSource")
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl CsvRecordSource {
    /// Open `path` and read its header row.
    ///
    /// Compressed inputs (`.csv.gz`, `.csv.zst`, ...) are decoded transparently.
    ///
    /// # Errors
    /// [`StreamError::SourceNotFound`] if the file is missing,
    /// [`StreamError::SourceRead`] on I/O failure, and [`StreamError::Parse`]
    /// if the header cannot be decoded or repeats a column name.
    pub fn open(path: impl Into<PathBuf>, delimiter: u8) -> Result<Self, StreamError> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| StreamError::from_source_io(&path, e))?;
        let raw = decoding_reader(file, &path).map_err(|e| StreamError::from_source_io(&path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .delimiter(delimiter)
            .from_reader(raw);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(&path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut seen = HashSet::new();
        if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(StreamError::Parse {
                path,
                line: 1,
                message: format!("duplicate column {dup:?}"),
            });
        }

        tracing::debug!(path = %path.display(), columns = headers.len(), "opened csv source");
        Ok(Self {
            path,
            headers: headers.into(),
            reader,
            done: false,
        })
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for CsvRecordSource {
    type Item = Result<CsvRecord, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut row = csv::StringRecord::new();
        match self.reader.read_record(&mut row) {
            Ok(true) => {
                let line = row.position().map_or(0, csv::Position::line);
                let values = row.iter().map(str::to_string).collect();
                Some(Ok(CsvRecord::new(Arc::clone(&self.headers), values, line)))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(csv_error(&self.path, e)))
            }
        }
    }
}

impl std::iter::FusedIterator for CsvRecordSource {}

fn csv_error(path: &Path, err: csv::Error) -> StreamError {
    let line = err.position().map_or(0, csv::Position::line);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => StreamError::from_source_io(path, e),
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => StreamError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("expected {expected_len} fields, found {len}"),
        },
        csv::ErrorKind::Utf8 { err, .. } => StreamError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("invalid UTF-8 in field {}", err.field() + 1),
        },
        other => StreamError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("{other:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn yields_records_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "users.csv", "favorite_os,id\nmacos,1\nlinux,2\n");
        let src = CsvRecordSource::open(&p, b',').unwrap();
        assert_eq!(src.headers(), ["favorite_os", "id"]);
        let rows: Vec<CsvRecord> = src.collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("favorite_os"), Some("macos"));
        assert_eq!(rows[1].get("id"), Some("2"));
        assert_eq!(rows[1].line(), 3);
        assert_eq!(rows[0].get("missing"), None);
    }

    #[test]
    fn serializes_as_flat_object_in_header_order() {
        let headers: Arc<[String]> = vec!["z".to_string(), "a".to_string()].into();
        let rec = CsvRecord::new(headers, vec!["1".into(), "2".into()], 2);
        assert_eq!(serde_json::to_string(&rec).unwrap(), r#"{"z":"1","a":"2"}"#);
    }

    #[test]
    fn short_row_is_a_parse_error_with_line() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "bad.csv", "a,b\n1,2\n3\n");
        let results: Vec<_> = CsvRecordSource::open(&p, b',').unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match results[1].as_ref().unwrap_err() {
            StreamError::Parse { line, .. } => assert_eq!(*line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "dup.csv", "id,id\n1,2\n");
        let err = CsvRecordSource::open(&p, b',').unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvRecordSource::open(dir.path().join("none.csv"), b',').unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[test]
    fn custom_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(&dir, "semi.csv", "os;id\nmacos;7\n");
        let rows: Vec<CsvRecord> = CsvRecordSource::open(&p, b';')
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows[0].get("id"), Some("7"));
    }
}
