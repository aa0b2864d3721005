//! Low-level binary reading utilities for container and payload parsing.
//!
//! Every read is bounds-checked against the underlying slice. Running off
//! the end yields [`Error::CorruptHeader`] carrying the offset of the read,
//! never a panic.

use crate::{Error, Result};

/// A forward-only cursor over a byte slice.
///
/// Mirrors what `std::io::Cursor` offers, but fails with a positioned
/// [`Error::CorruptHeader`] instead of a bare `UnexpectedEof`.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at `pos`.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Returns the number of bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Reads `count` bytes and advances past them.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = read_bytes_at(self.buf, self.pos, count)?;
        self.pos += count;
        Ok(bytes)
    }

    /// Advances past `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Reads an unsigned 16-bit little-endian integer.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let value = read_u16_le_at(self.buf, self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    /// Reads an unsigned 32-bit little-endian integer.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let value = read_u32_le_at(self.buf, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    /// Reads a signed 32-bit little-endian integer.
    pub fn read_i32_le(&mut self) -> Result<i32> {
        let value = read_i32_le_at(self.buf, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    /// Reads a zero-terminated string, consuming the terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_cstr(&mut self) -> Result<String> {
        let rest = self.buf.get(self.pos..).unwrap_or(&[]);
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::corrupt_header(self.pos, "unterminated name"))?;
        let name = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(name)
    }
}

/// Returns `count` bytes starting at `pos`.
pub fn read_bytes_at(buf: &[u8], pos: usize, count: usize) -> Result<&[u8]> {
    pos.checked_add(count)
        .and_then(|end| buf.get(pos..end))
        .ok_or_else(|| {
            Error::corrupt_header(
                pos,
                format!(
                    "need {} bytes, only {} available",
                    count,
                    buf.len().saturating_sub(pos)
                ),
            )
        })
}

fn read_array_at<const N: usize>(buf: &[u8], pos: usize) -> Result<[u8; N]> {
    let bytes = read_bytes_at(buf, pos, N)?;
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    Ok(array)
}

/// Reads an unsigned 16-bit little-endian integer at `pos`.
pub fn read_u16_le_at(buf: &[u8], pos: usize) -> Result<u16> {
    read_array_at(buf, pos).map(u16::from_le_bytes)
}

/// Reads an unsigned 32-bit little-endian integer at `pos`.
pub fn read_u32_le_at(buf: &[u8], pos: usize) -> Result<u32> {
    read_array_at(buf, pos).map(u32::from_le_bytes)
}

/// Reads a signed 32-bit little-endian integer at `pos`.
pub fn read_i32_le_at(buf: &[u8], pos: usize) -> Result<i32> {
    read_array_at(buf, pos).map(i32::from_le_bytes)
}

/// Reads an unsigned 64-bit little-endian integer at `pos`.
pub fn read_u64_le_at(buf: &[u8], pos: usize) -> Result<u64> {
    read_array_at(buf, pos).map(u64::from_le_bytes)
}

/// Interprets `bytes` as a big-endian unsigned integer.
///
/// Returns `None` when the value does not fit in a `u64`; leading zero
/// bytes beyond the eighth are allowed.
pub fn uint_from_be(bytes: &[u8]) -> Option<u64> {
    let significant = bytes
        .iter()
        .position(|&b| b != 0)
        .map_or(&[][..], |first| &bytes[first..]);
    if significant.len() > 8 {
        return None;
    }
    Some(
        significant
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
    )
}

/// Interprets `bytes` as a little-endian unsigned integer.
///
/// Returns `None` when the value does not fit in a `u64`.
pub fn uint_from_le(bytes: &[u8]) -> Option<u64> {
    let mut reversed = bytes.to_vec();
    reversed.reverse();
    uint_from_be(&reversed)
}

/// Converts a `u64` read from a buffer into a `usize` offset.
pub fn to_offset(value: u64, at: usize) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::corrupt_header(at, format!("offset {:#x} out of range", value)))
}
