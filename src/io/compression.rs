//! Transparent decompression for document and CSV sources.
//!
//! Sources consult a small registry of [`CompressionCodec`]s keyed by file
//! extension. When a source path ends with a registered extension the raw file
//! is wrapped in the codec's decoder, so chunking and CSV parsing see plain
//! bytes. Rotated logs (`app.log.gz`) stream exactly like `app.log`.
//!
//! Detection is extension-only. Plain text can legitimately start with bytes
//! that look like a codec signature (`BZ...`), so content sniffing is not used.
//!
//! Built-in codecs, each behind a feature flag:
//! - **gzip** (`.gz`) via `flate2` (`compression-gzip`, default)
//! - **zstd** (`.zst`) via `zstd` (`compression-zstd`, default)
//! - **bzip2** (`.bz2`) via `bzip2` (`compression-bzip2`)
//! - **xz** (`.xz`) via `xz2` (`compression-xz`)

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Boxed reader handed to sources.
pub type DynRead = Box<dyn Read + Send>;

static CODEC_REGISTRY: LazyLock<RwLock<Vec<Arc<dyn CompressionCodec>>>> =
    LazyLock::new(|| RwLock::new(builtin_codecs()));

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
        #[cfg(feature = "compression-bzip2")]
        Arc::new(Bzip2Codec),
        #[cfg(feature = "compression-xz")]
        Arc::new(XzCodec),
    ]
}

/// A decoder that can be placed in front of a source file.
///
/// Implementations must be `Send + Sync`; they live in a process-wide registry.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip").
    fn name(&self) -> &str;

    /// Lowercase extensions with the leading dot (e.g., `&[".gz"]`).
    fn extensions(&self) -> &[&str];

    /// Wrap a raw reader with decompression.
    fn wrap_reader(&self, reader: DynRead) -> io::Result<DynRead>;
}

/// Register an additional codec. Later registrations do not shadow earlier
/// ones for the same extension.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(codec);
}

/// Find the codec whose extension matches `path`, case-insensitively.
#[must_use]
pub fn codec_for_path(path: impl AsRef<Path>) -> Option<Arc<dyn CompressionCodec>> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    CODEC_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .find(|codec| codec.extensions().iter().any(|ext| name.ends_with(ext)))
        .cloned()
}

/// Wrap an opened source file with the decoder its name calls for, if any.
///
/// # Errors
/// Propagates the codec's construction error (e.g. a zstd frame header that
/// cannot be read).
pub fn decoding_reader(file: File, path: impl AsRef<Path>) -> io::Result<DynRead> {
    match codec_for_path(&path) {
        Some(codec) => {
            tracing::trace!(codec = codec.name(), path = %path.as_ref().display(), "decompressing source");
            codec.wrap_reader(Box::new(file))
        }
        None => Ok(Box::new(file)),
    }
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn wrap_reader(&self, reader: DynRead) -> io::Result<DynRead> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn wrap_reader(&self, reader: DynRead) -> io::Result<DynRead> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as DynRead)
    }
}

#[cfg(feature = "compression-bzip2")]
struct Bzip2Codec;

#[cfg(feature = "compression-bzip2")]
impl CompressionCodec for Bzip2Codec {
    fn name(&self) -> &str {
        "bzip2"
    }

    fn extensions(&self) -> &[&str] {
        &[".bz2", ".bzip2"]
    }

    fn wrap_reader(&self, reader: DynRead) -> io::Result<DynRead> {
        Ok(Box::new(bzip2::read::MultiBzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-xz")]
struct XzCodec;

#[cfg(feature = "compression-xz")]
impl CompressionCodec for XzCodec {
    fn name(&self) -> &str {
        "xz"
    }

    fn extensions(&self) -> &[&str] {
        &[".xz"]
    }

    fn wrap_reader(&self, reader: DynRead) -> io::Result<DynRead> {
        Ok(Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)))
    }
}
