//! Throwaway document roots and sample data.

use crate::config::StreamConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// CSV with the `favorite_os` column used across the filter examples.
pub const FAVORITE_OS_CSV: &str = "favorite_os,id\nmacos,1\nlinux,2\nmacos,3\n";

/// Expected JSONL for [`FAVORITE_OS_CSV`] filtered on `favorite_os == "macos"`.
pub const FAVORITE_OS_MACOS_JSONL: &str =
    "{\"favorite_os\":\"macos\",\"id\":\"1\"}\n{\"favorite_os\":\"macos\",\"id\":\"3\"}\n";

/// A temporary document root plus a [`StreamConfig`] pointing at it.
///
/// The directory is removed when the fixture is dropped.
///
/// # Example
///
/// ```
/// use docstream::testing::DocFixture;
///
/// let fx = DocFixture::new().unwrap().with_document("log", "boot ok\n").unwrap();
/// assert!(fx.path("log.txt").exists());
/// ```
#[derive(Debug)]
pub struct DocFixture {
    dir: TempDir,
    config: StreamConfig,
}

impl DocFixture {
    /// # Errors
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        let dir = TempDir::new()?;
        let config = StreamConfig::default().with_doc_root(dir.path());
        Ok(Self { dir, config })
    }

    /// Replace the configuration, keeping `doc_root` on the fixture directory.
    #[must_use]
    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config.with_doc_root(self.dir.path());
        self
    }

    /// Add `<name>.<extension>` with `text`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn with_document(self, name: &str, text: &str) -> io::Result<Self> {
        self.write_document(name, text)?;
        Ok(self)
    }

    /// Write `<name>.<extension>` and return its path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_document(&self, name: &str, text: &str) -> io::Result<PathBuf> {
        self.write_file(&format!("{name}.{}", self.config.extension), text.as_bytes())
    }

    /// Write an arbitrary file under the root and return its path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_file(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let p = self.path(file_name);
        fs::write(&p, bytes)?;
        Ok(p)
    }

    #[must_use]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

/// Deterministic multi-line text of roughly `bytes` bytes, ASCII only.
#[must_use]
pub fn sample_text(bytes: usize) -> String {
    const WORDS: [&str; 8] = ["stream", "chunk", "poema", "log", "byte", "line", "word", "sink"];
    let mut out = String::with_capacity(bytes + 8);
    let mut i = 0usize;
    while out.len() < bytes {
        out.push_str(WORDS[i % WORDS.len()]);
        out.push(if i % 7 == 6 { '\n' } else { ' ' });
        i += 1;
    }
    out.truncate(bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_text_has_exact_length() {
        assert_eq!(sample_text(0).len(), 0);
        assert_eq!(sample_text(1000).len(), 1000);
        assert!(sample_text(200).contains('\n'));
    }

    #[test]
    fn fixture_config_points_at_root() {
        let fx = DocFixture::new().unwrap();
        assert_eq!(fx.config().doc_root, fx.root());
    }
}
