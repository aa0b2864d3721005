//! Zlib-framed deflate codec for embedded payloads.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::bufread::ZlibDecoder as FlateDecoder;
use flate2::write::ZlibEncoder as FlateEncoder;

use super::BlobCodec;
use crate::options::DEFAULT_MAX_PAYLOAD_SIZE;
use crate::{Error, Result};

/// Zlib decoder.
pub struct ZlibDecoder<R> {
    inner: FlateDecoder<R>,
}

impl<R> std::fmt::Debug for ZlibDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZlibDecoder").finish_non_exhaustive()
    }
}

impl<R: io::BufRead> ZlibDecoder<R> {
    /// Creates a new zlib decoder.
    ///
    /// # Arguments
    ///
    /// * `input` - The compressed data source (must implement BufRead)
    pub fn new(input: R) -> Self {
        Self {
            inner: FlateDecoder::new(input),
        }
    }
}

impl<R: io::BufRead> Read for ZlibDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Zlib encoder.
pub struct ZlibEncoder<W: Write> {
    inner: FlateEncoder<W>,
}

impl<W: Write> std::fmt::Debug for ZlibEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZlibEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> ZlibEncoder<W> {
    /// Creates a new zlib encoder at `level` (clamped to 0-9).
    pub fn new(output: W, level: u32) -> Self {
        Self {
            inner: FlateEncoder::new(output, Compression::new(level.min(9))),
        }
    }

    /// Finishes encoding and returns the underlying writer.
    pub fn try_finish(self) -> io::Result<W> {
        self.inner.finish()
    }
}

impl<W: Write> Write for ZlibEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// The payload codec: zlib framing, configurable level, bounded output.
#[derive(Debug, Clone)]
pub struct ZlibCodec {
    level: u32,
    max_output: u64,
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self {
            level: 9,
            max_output: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl ZlibCodec {
    /// Creates a codec compressing at `level` (clamped to 0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
            ..Self::default()
        }
    }

    /// Sets the largest decompressed output accepted.
    pub fn max_output(mut self, bytes: u64) -> Self {
        self.max_output = bytes;
        self
    }

    /// Returns the compression level.
    pub fn level(&self) -> u32 {
        self.level
    }
}

impl BlobCodec for ZlibCodec {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut limited = ZlibDecoder::new(data).take(self.max_output.saturating_add(1));
        let mut output = Vec::new();
        limited
            .read_to_end(&mut output)
            .map_err(|e| Error::CorruptData(e.to_string()))?;
        if output.len() as u64 > self.max_output {
            return Err(Error::ResourceLimitExceeded(format!(
                "decompressed payload exceeds limit of {} bytes",
                self.max_output
            )));
        }
        Ok(output)
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder.write_all(data)?;
        Ok(encoder.try_finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_roundtrip() {
        let data = b"Hello, World! This is a test of zlib compression.".repeat(8);
        let codec = ZlibCodec::default();
        let compressed = codec.compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(codec.decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_zlib_header_present() {
        let compressed = ZlibCodec::new(9).compress(b"abc").unwrap();
        // CMF byte for deflate with a 32K window
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn test_levels_decompress_identically() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let fast = ZlibCodec::new(1).compress(&data).unwrap();
        let best = ZlibCodec::new(9).compress(&data).unwrap();
        let codec = ZlibCodec::default();
        assert_eq!(codec.decompress(&fast).unwrap(), data);
        assert_eq!(codec.decompress(&best).unwrap(), data);
    }

    #[test]
    fn test_level_clamped() {
        assert_eq!(ZlibCodec::new(42).level(), 9);
    }

    #[test]
    fn test_garbage_is_corrupt_data() {
        let err = ZlibCodec::default()
            .decompress(b"definitely not zlib")
            .unwrap_err();
        assert!(matches!(err, Error::CorruptData(_)));
    }

    #[test]
    fn test_output_limit() {
        let data = vec![0u8; 10_000];
        let compressed = ZlibCodec::default().compress(&data).unwrap();
        let err = ZlibCodec::default()
            .max_output(1_000)
            .decompress(&compressed)
            .unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));

        let exact = ZlibCodec::default().max_output(10_000);
        assert_eq!(exact.decompress(&compressed).unwrap().len(), 10_000);
    }
}
