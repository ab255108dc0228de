//! Per-run statistics.
//!
//! Every [`Pipeline::run`](crate::Pipeline::run) returns a [`RunSummary`]
//! describing what happened: how many records were read, how many the filter
//! dropped, how many reached the sink and how many bytes that was. Summaries
//! render as JSON for logs or can be saved next to the output they describe.
//!
//! ```no_run
//! use docstream::{filter_csv_to_jsonl, FieldFilter, StreamConfig};
//! # fn main() -> anyhow::Result<()> {
//! let summary = filter_csv_to_jsonl(
//!     &StreamConfig::default(),
//!     "doc/users.csv",
//!     "out/macos.jsonl",
//!     FieldFilter::equals("favorite_os", "macos"),
//! )?;
//! summary.save_to_file("out/macos.summary.json")?;
//! # Ok(())
//! # }
//! ```

use crate::pipeline::PipelineKind;
use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub kind: PipelineKind,
    /// Records pulled from the source.
    pub records_read: u64,
    /// Records rejected by the filter.
    pub records_dropped: u64,
    /// Records handed to the sink.
    pub records_emitted: u64,
    pub bytes_written: u64,
    /// Pacing pauses taken.
    pub pauses: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl RunSummary {
    #[must_use]
    pub fn new(kind: PipelineKind) -> Self {
        Self {
            kind,
            records_read: 0,
            records_dropped: 0,
            records_emitted: 0,
            bytes_written: 0,
            pauses: 0,
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Save the summary as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let formatted = serde_json::to_string_pretty(self)?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: read {}, dropped {}, emitted {} ({} bytes) in {} ms",
            self.kind,
            self.records_read,
            self.records_dropped,
            self.records_emitted,
            self.bytes_written,
            self.elapsed.as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_uses_millis_and_kebab_kind() {
        let mut s = RunSummary::new(PipelineKind::FilterTransform);
        s.records_read = 3;
        s.records_dropped = 1;
        s.records_emitted = 2;
        s.elapsed = Duration::from_millis(12);
        let v = s.to_json();
        assert_eq!(v["kind"], json!("filter-transform"));
        assert_eq!(v["elapsed_ms"], json!(12));
        assert_eq!(v["records_emitted"], json!(2));
    }

    #[test]
    fn save_to_file_round_trips_through_json() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let p = dir.path().join("summary.json");
        RunSummary::new(PipelineKind::PassThrough).save_to_file(&p)?;
        let v: Value = serde_json::from_str(&std::fs::read_to_string(&p)?)?;
        assert_eq!(v["kind"], json!("pass-through"));
        Ok(())
    }

    #[test]
    fn display_is_one_line() {
        let s = RunSummary::new(PipelineKind::WordPaced);
        assert_eq!(s.to_string(), "word-paced: read 0, dropped 0, emitted 0 (0 bytes) in 0 ms");
    }
}
