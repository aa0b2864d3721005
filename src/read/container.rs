//! Container opening and directory-chain traversal.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::format::reader::{read_bytes_at, read_u64_le_at, to_offset};
use crate::format::{FIRST_BLOCK_POINTER_OFFSET, MAGIC};
use crate::observe::{NoObserver, Observer};
use crate::options::NameEncoding;
use crate::{Error, Result};

use super::entry::{DirectoryBlock, ExtractedFile, FileEntry};

/// An opened resource container.
///
/// Owns the whole file as one byte buffer. Opening validates the magic
/// string only; directory structures are parsed lazily by [`blocks`],
/// [`entries`] and [`extract`].
///
/// [`blocks`]: Container::blocks
/// [`entries`]: Container::entries
/// [`extract`]: Container::extract
#[derive(Debug, Clone)]
pub struct Container {
    bytes: Vec<u8>,
    encoding: NameEncoding,
}

impl Container {
    /// Opens a container from its bytes, with UTF-16 entry names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if the buffer does not start with
    /// the `Resource File V2.2` magic.
    pub fn open(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::open_with_encoding(bytes, NameEncoding::default())
    }

    /// Opens a container whose entry names use `encoding`.
    pub fn open_with_encoding(bytes: impl Into<Vec<u8>>, encoding: NameEncoding) -> Result<Self> {
        let bytes = bytes.into();
        if !bytes.starts_with(MAGIC) {
            return Err(Error::InvalidFormat(format!(
                "expected '{}' magic",
                String::from_utf8_lossy(MAGIC)
            )));
        }
        Ok(Self { bytes, encoding })
    }

    /// Reads and opens a container file.
    ///
    /// The file handle lives only for the duration of the read.
    pub fn open_path(path: impl AsRef<Path>, encoding: NameEncoding) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::open_with_encoding(bytes, encoding)
    }

    /// Returns the container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the container and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns the container size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the container holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the entry name encoding.
    pub fn encoding(&self) -> NameEncoding {
        self.encoding
    }

    /// Reads the pointer to the first directory block.
    pub fn first_block_pointer(&self) -> Result<u64> {
        read_u64_le_at(&self.bytes, FIRST_BLOCK_POINTER_OFFSET)
    }

    /// Iterates over the directory block chain.
    ///
    /// The chain ends at a zero pointer, a pointer at or past the end of the
    /// container, or a pointer that was already visited.
    pub fn blocks(&self) -> Blocks<'_> {
        match self.first_block_pointer() {
            Ok(pointer) => Blocks::new(&self.bytes, pointer),
            Err(e) => Blocks::failed(&self.bytes, e),
        }
    }

    /// Lists every file entry across all directory blocks, in chain order.
    pub fn entries(&self) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for block in self.blocks() {
            let block = block?;
            for index in 0..block.file_count {
                let offset = block.entry_offset(index)?;
                entries.push(FileEntry::parse(&self.bytes, offset, self.encoding)?);
            }
        }
        Ok(entries)
    }

    /// Finds the directory entry named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] when no block in the chain lists it.
    pub fn find_entry(&self, name: &str, observer: &mut dyn Observer) -> Result<FileEntry> {
        for block in self.blocks() {
            let block = block?;
            observer.on_block(block.offset, block.file_count);
            for index in 0..block.file_count {
                let offset = block.entry_offset(index)?;
                let entry = FileEntry::parse(&self.bytes, offset, self.encoding)?;
                let matched = entry.name == name;
                observer.on_entry(&entry.name, matched);
                if matched {
                    return Ok(entry);
                }
            }
        }
        Err(Error::EntryNotFound {
            path: name.to_string(),
        })
    }

    /// Extracts the stored bytes of the file named `name`.
    pub fn extract(&self, name: &str) -> Result<ExtractedFile> {
        self.extract_with(name, &mut NoObserver)
    }

    /// Extracts the stored bytes of `name`, reporting to `observer`.
    pub fn extract_with(&self, name: &str, observer: &mut dyn Observer) -> Result<ExtractedFile> {
        let entry = self.find_entry(name, observer)?;
        let offsets = entry.field_offsets();
        let pointer = to_offset(entry.data_pointer, offsets.data_pointer)?;
        let size = to_offset(entry.size, offsets.size)?;
        let data = read_bytes_at(&self.bytes, pointer, size)?.to_vec();
        Ok(ExtractedFile {
            entry,
            data,
            offsets,
        })
    }
}

/// Iterator over the directory blocks of a container.
///
/// Created by [`Container::blocks`]. Yields an error at most once, then stops.
#[derive(Debug)]
pub struct Blocks<'a> {
    bytes: &'a [u8],
    next: Option<u64>,
    visited: HashSet<u64>,
    pending_error: Option<Error>,
}

impl<'a> Blocks<'a> {
    fn new(bytes: &'a [u8], first: u64) -> Self {
        let mut blocks = Self {
            bytes,
            next: Some(first),
            visited: HashSet::new(),
            pending_error: None,
        };
        if !blocks.in_range(first) {
            blocks.next = None;
            blocks.pending_error = Some(Error::corrupt_header(
                FIRST_BLOCK_POINTER_OFFSET,
                format!("first directory block pointer {:#x} is outside the container", first),
            ));
        }
        blocks
    }

    fn failed(bytes: &'a [u8], error: Error) -> Self {
        Self {
            bytes,
            next: None,
            visited: HashSet::new(),
            pending_error: Some(error),
        }
    }

    fn in_range(&self, pointer: u64) -> bool {
        pointer != 0 && pointer < self.bytes.len() as u64
    }
}

impl Iterator for Blocks<'_> {
    type Item = Result<DirectoryBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending_error.take() {
            return Some(Err(error));
        }
        let pointer = self.next.take()?;
        if !self.in_range(pointer) {
            return None;
        }
        if !self.visited.insert(pointer) {
            log::warn!("directory chain loops back to block {:#x}", pointer);
            return None;
        }
        // in_range guarantees the pointer fits in usize
        let offset = pointer as usize;
        match DirectoryBlock::parse(self.bytes, offset) {
            Ok(block) => {
                self.next = Some(block.next_block);
                Some(Ok(block))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
