//! Assertion helpers for streamed output.

use crate::source::Chunk;
use std::fmt::Write as _;
use std::path::Path;

/// Assert that `chunks` tile `original` exactly: non-empty, each at most
/// `buffer_size` bytes, contiguous offsets, and concatenating to the input.
///
/// # Panics
///
/// Panics with the first violated property.
pub fn assert_chunks_cover(chunks: &[Chunk], original: &str, buffer_size: usize) {
    let mut expected_offset = 0u64;
    let mut joined = String::with_capacity(original.len());
    for (i, c) in chunks.iter().enumerate() {
        assert!(!c.is_empty(), "chunk #{i} is empty");
        assert!(
            c.len() <= buffer_size,
            "chunk #{i} is {} bytes, over the {buffer_size}-byte buffer",
            c.len()
        );
        assert_eq!(c.offset(), expected_offset, "chunk #{i} offset is not contiguous");
        expected_offset += c.len() as u64;
        joined.push_str(c.as_str());
    }
    assert!(
        joined == original,
        "chunks do not reproduce the input ({} vs {} bytes)",
        joined.len(),
        original.len()
    );
}

/// Assert that the file at `path` holds exactly `expected` JSONL lines.
///
/// # Panics
///
/// Panics if the file cannot be read or its content differs.
pub fn assert_jsonl_lines(path: impl AsRef<Path>, expected: &[&str]) {
    let path = path.as_ref();
    let actual = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    let mut want = String::new();
    for line in expected {
        let _ = writeln!(want, "{line}");
    }
    assert_eq!(actual, want, "JSONL mismatch in {}", path.display());
}
