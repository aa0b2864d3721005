//! Payload compression.
//!
//! Embedded files are stored zlib-compressed. The [`BlobCodec`] trait is the
//! seam between the pipeline and the compression library; [`ZlibCodec`] is
//! the implementation used for the observed container version.

pub mod deflate;

use crate::Result;

pub use deflate::{ZlibCodec, ZlibDecoder, ZlibEncoder};

/// A reversible whole-buffer transform applied to embedded payloads.
///
/// `decompress(compress(x))` must return `x`; the compressed bytes
/// themselves may differ between implementations or levels.
pub trait BlobCodec {
    /// Restores the original bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`](crate::Error::CorruptData) when the
    /// input is not a valid stream.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Compresses `data`.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Decompresses a payload with the default codec.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    ZlibCodec::default().decompress(data)
}

/// Compresses a payload at `level` with the default codec.
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    ZlibCodec::new(level).compress(data)
}
