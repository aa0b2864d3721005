//! Appending a payload to a container.

use crate::format::{CLOSING_REGION_LEN, TRAILER_MARKER};
use crate::observe::{NoObserver, Observer};
use crate::read::EntryOffsets;
use crate::{Error, Result};

/// Appends `compressed` to `container` and redirects the entry at `offsets`
/// to it.
///
/// The new container is laid out as:
///
/// ```text
/// [original bytes, entry fields patched][compressed][marker][last 80 original bytes]
/// ```
///
/// The data pointer becomes the original container length; the size and
/// compressed-size fields both receive the compressed length.
pub fn commit(container: &[u8], offsets: &EntryOffsets, compressed: &[u8]) -> Result<Vec<u8>> {
    commit_with(container, offsets, compressed, &mut NoObserver)
}

/// Like [`commit`], reporting the new data pointer and size to `observer`.
///
/// # Errors
///
/// Returns [`Error::CorruptHeader`] if the container is shorter than the
/// 80-byte closing region or an entry field lies outside it.
pub fn commit_with(
    container: &[u8],
    offsets: &EntryOffsets,
    compressed: &[u8],
    observer: &mut dyn Observer,
) -> Result<Vec<u8>> {
    let closing_start = container
        .len()
        .checked_sub(CLOSING_REGION_LEN)
        .ok_or_else(|| {
            Error::corrupt_header(
                0usize,
                format!(
                    "container of {} bytes is shorter than its {}-byte closing region",
                    container.len(),
                    CLOSING_REGION_LEN
                ),
            )
        })?;
    for field in [offsets.data_pointer, offsets.compressed_size, offsets.size] {
        if field.checked_add(8).is_none_or(|end| end > container.len()) {
            return Err(Error::corrupt_header(
                field,
                "directory entry field outside the container",
            ));
        }
    }

    let data_pointer = container.len() as u64;
    let size = compressed.len() as u64;
    let mut out = Vec::with_capacity(
        container.len() + compressed.len() + TRAILER_MARKER.len() + CLOSING_REGION_LEN,
    );
    out.extend_from_slice(container);
    put_u64(&mut out, offsets.size, size);
    put_u64(&mut out, offsets.compressed_size, size);
    put_u64(&mut out, offsets.data_pointer, data_pointer);
    out.extend_from_slice(compressed);
    out.extend_from_slice(TRAILER_MARKER);
    out.extend_from_slice(&container[closing_start..]);

    observer.on_commit(data_pointer, size);
    Ok(out)
}

fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
