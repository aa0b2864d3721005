//! Directory blocks and file entries.

use crate::format::reader::{read_bytes_at, read_u32_le_at, read_u64_le_at, to_offset};
use crate::format::{block, entry};
use crate::options::NameEncoding;
use crate::{Error, Result};

/// A directory block header.
///
/// The block's file entries are stored immediately before the header, in
/// the `directory_size` bytes ending at [`offset`](Self::offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryBlock {
    /// Position of the header in the container.
    pub offset: usize,
    /// Block flags, carried through untouched.
    pub flags: u32,
    /// Number of file entries in the block.
    pub file_count: u32,
    /// Size of the entry table in bytes.
    pub directory_size: u64,
    /// Decompressed size of the entry table.
    pub decompressed_size: u64,
    /// Pointer to the next block in the chain.
    pub next_block: u64,
}

impl DirectoryBlock {
    /// Parses the block header at `offset`.
    pub fn parse(buf: &[u8], offset: usize) -> Result<Self> {
        let field = |rel: usize| {
            offset
                .checked_add(rel)
                .ok_or_else(|| Error::corrupt_header(offset, "block offset overflow"))
        };
        Ok(Self {
            offset,
            flags: read_u32_le_at(buf, field(block::FLAGS)?)?,
            file_count: read_u32_le_at(buf, field(block::FILE_COUNT)?)?,
            directory_size: read_u64_le_at(buf, field(block::DIRECTORY_SIZE)?)?,
            decompressed_size: read_u64_le_at(buf, field(block::DECOMPRESSED_SIZE)?)?,
            next_block: read_u64_le_at(buf, field(block::NEXT_BLOCK)?)?,
        })
    }

    /// Returns the position of the entry table.
    pub fn directory_start(&self) -> Result<usize> {
        let size = to_offset(self.directory_size, self.offset + block::DIRECTORY_SIZE)?;
        self.offset.checked_sub(size).ok_or_else(|| {
            Error::corrupt_header(
                self.offset,
                format!(
                    "directory size {:#x} reaches before the start of the container",
                    self.directory_size
                ),
            )
        })
    }

    /// Returns the position of entry `index`.
    pub fn entry_offset(&self, index: u32) -> Result<usize> {
        let start = self.directory_start()?;
        (index as usize)
            .checked_mul(entry::WIDTH)
            .and_then(|rel| start.checked_add(rel))
            .ok_or_else(|| Error::corrupt_header(start, "entry offset overflow"))
    }
}

/// Absolute positions of the patchable fields of one file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOffsets {
    /// Data pointer field.
    pub data_pointer: usize,
    /// Compressed size field.
    pub compressed_size: usize,
    /// Size field.
    pub size: usize,
}

/// A file entry from a directory block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Name with zero characters removed.
    pub name: String,
    /// Position of the entry record in the container.
    pub offset: usize,
    /// Position of the stored bytes.
    pub data_pointer: u64,
    /// Compressed size.
    pub compressed_size: u64,
    /// Number of stored bytes at the data pointer.
    pub size: u64,
    /// Modification timestamp.
    pub timestamp: u64,
}

impl FileEntry {
    /// Parses the entry record at `offset`.
    pub fn parse(buf: &[u8], offset: usize, encoding: NameEncoding) -> Result<Self> {
        let name_field = read_bytes_at(buf, offset, entry::NAME_WIDTH)?;
        let field = |rel: usize| read_u64_le_at(buf, offset.saturating_add(rel));
        Ok(Self {
            name: encoding.decode(name_field),
            offset,
            data_pointer: field(entry::DATA_POINTER)?,
            compressed_size: field(entry::COMPRESSED_SIZE)?,
            size: field(entry::SIZE)?,
            timestamp: field(entry::TIMESTAMP)?,
        })
    }

    /// Returns the absolute positions of the fields a commit rewrites.
    pub fn field_offsets(&self) -> EntryOffsets {
        EntryOffsets {
            data_pointer: self.offset + entry::DATA_POINTER,
            compressed_size: self.offset + entry::COMPRESSED_SIZE,
            size: self.offset + entry::SIZE,
        }
    }
}

/// An embedded file pulled out of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// The directory entry that listed the file.
    pub entry: FileEntry,
    /// The stored (still compressed) bytes.
    pub data: Vec<u8>,
    /// Field positions for a later commit.
    pub offsets: EntryOffsets,
}
