//! Resource container constants, layouts, and low-level parsing utilities.
//!
//! Everything here describes the one observed container version,
//! `Resource File V2.2`, and the game-setup payload it embeds. The widths and
//! the padding rule are properties of that version only.

pub mod reader;

/// The container magic string.
///
/// Every supported container starts with these 18 ASCII bytes.
pub const MAGIC: &[u8; 18] = b"Resource File V2.2";

/// Offset of the `u64` pointer to the first directory block.
///
/// The pointer sits after the magic and a 766-byte reserved header area.
pub const FIRST_BLOCK_POINTER_OFFSET: usize = 784;

/// Directory block header layout, relative to the block pointer.
pub mod block {
    /// Block flags (`u32`).
    pub const FLAGS: usize = 0;
    /// Number of file entries in the block (`u32`).
    pub const FILE_COUNT: usize = 4;
    /// Size of the entry table preceding the header (`u64`).
    pub const DIRECTORY_SIZE: usize = 8;
    /// Decompressed directory size (`u64`).
    pub const DECOMPRESSED_SIZE: usize = 16;
    /// Pointer to the next block (`u64`).
    pub const NEXT_BLOCK: usize = 24;
    /// Total header length.
    pub const HEADER_SIZE: usize = 32;
}

/// File entry layout, relative to the start of the entry.
pub mod entry {
    /// Width of the zero-padded name field.
    pub const NAME_WIDTH: usize = 520;
    /// Data pointer (`u64`).
    pub const DATA_POINTER: usize = NAME_WIDTH;
    /// Compressed size (`u64`).
    pub const COMPRESSED_SIZE: usize = NAME_WIDTH + 8;
    /// Size (`u64`); the number of stored bytes at the data pointer.
    pub const SIZE: usize = NAME_WIDTH + 16;
    /// Modification timestamp (`u64`).
    pub const TIMESTAMP: usize = NAME_WIDTH + 24;
    /// Reserved (`u64`).
    pub const RESERVED: usize = NAME_WIDTH + 32;
    /// Total width of one entry.
    pub const WIDTH: usize = 560;
}

/// Bytes appended after a relocated payload.
pub const TRAILER_MARKER: &[u8] = b"xda030000000001f00000";

/// Length of the closing region that must stay at the very end of the
/// container after a payload has been appended.
pub const CLOSING_REGION_LEN: usize = 80;

/// Name of the embedded game-setup file.
pub const GAME_SETUP_FILE: &str = "gamesetup.a7s";

/// Game-setup payload (tree stream) constants.
pub mod tree {
    /// Element ids at or above this value are attributes.
    pub const ATTRIBUTE_ID_MIN: i32 = 32768;
    /// Attribute records occupy a multiple of this many bytes.
    pub const CONTENT_BLOCK: usize = 8;
    /// Record header: `u32` content size + `i32` element id.
    pub const RECORD_HEADER_LEN: usize = 8;
    /// Length of the payload trailer.
    pub const TRAILER_LEN: usize = 16;
    /// Offset of the tag-table pointer, counted back from the payload end.
    pub const TAG_TABLE_POINTER_FROM_END: usize = 16;
    /// Offset of the attribute-table pointer, counted back from the payload end.
    pub const ATTRIBUTE_TABLE_POINTER_FROM_END: usize = 12;
    /// Width of the list counter attribute content.
    pub const COUNTER_WIDTH: usize = 8;
}

/// Returns the number of zero bytes following `content_len` content bytes
/// so that the content ends on a [`tree::CONTENT_BLOCK`] boundary.
pub fn content_padding(content_len: usize) -> usize {
    let rest = tree::CONTENT_BLOCK - content_len % tree::CONTENT_BLOCK;
    rest % tree::CONTENT_BLOCK
}
