//! JSON Lines encoding.
//!
//! Output is one compact JSON value per line, each terminated by `\n`, with no
//! pretty-printing and no separators between lines.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Append `value` as a single JSONL line to `out`.
///
/// # Errors
/// Fails only if `T`'s `Serialize` implementation reports an error.
pub fn encode_line<T: Serialize + ?Sized>(value: &T, out: &mut Vec<u8>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::from)?;
    out.push(b'\n');
    Ok(())
}

/// Read a JSONL file into a typed `Vec<T>`, skipping blank lines.
///
/// Intended for inspecting pipeline output; streaming consumers should read
/// line by line instead.
///
/// # Errors
/// Returns an error if the file cannot be read or a line fails to parse into
/// `T`. Errors include the line number.
pub fn read_jsonl_vec<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut out = Vec::<T>::new();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("read line {} in {}", i + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let v: T = serde_json::from_str(&line).with_context(|| {
            format!("parse JSONL line {} in {}: {}", i + 1, path.display(), line)
        })?;
        out.push(v);
    }
    Ok(out)
}
