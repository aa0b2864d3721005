//! Edit options and configuration for the save pipeline.
//!
//! The defaults describe the observed save layout: the `gamesetup.a7s`
//! file, its `ActiveDLCs` list with a `count` counter and `DLC` items of
//! four bytes, recompressed at the maximum level.

use crate::format::GAME_SETUP_FILE;
use crate::{Error, Result};

/// Default upper bound for a decompressed payload (256 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u64 = 256 * 1024 * 1024;

/// How directory entry names are stored in the fixed-width name field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameEncoding {
    /// UTF-16, little-endian code units.
    #[default]
    Utf16Le,
    /// UTF-8 bytes.
    Utf8,
}

impl NameEncoding {
    /// Decodes a zero-padded name field.
    ///
    /// Zero characters are dropped wherever they appear; malformed
    /// sequences are replaced.
    pub fn decode(self, field: &[u8]) -> String {
        match self {
            Self::Utf16Le => {
                let units: Vec<u16> = field
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .filter(|&unit| unit != 0)
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Self::Utf8 => String::from_utf8_lossy(field).replace('\0', ""),
        }
    }

    /// Encodes a name into a zero-padded field of `width` bytes.
    ///
    /// Names longer than the field are truncated.
    pub fn encode(self, name: &str, width: usize) -> Vec<u8> {
        let mut field: Vec<u8> = match self {
            Self::Utf16Le => name.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf8 => name.as_bytes().to_vec(),
        };
        field.resize(width, 0);
        field
    }
}

/// Names that locate the list being edited inside the game-setup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSchema {
    /// Tag that contains the list.
    pub container_tag: String,
    /// Attribute holding the number of items, directly under the container.
    pub counter_attribute: String,
    /// Attribute used for each list item.
    pub item_attribute: String,
    /// Declared content width of one item, in bytes.
    pub item_width: usize,
}

impl Default for ListSchema {
    fn default() -> Self {
        Self {
            container_tag: "ActiveDLCs".into(),
            counter_attribute: "count".into(),
            item_attribute: "DLC".into(),
            item_width: 4,
        }
    }
}

/// Options for opening, patching and writing a save container.
///
/// # Example
///
/// ```rust
/// use rdasave::EditOptions;
///
/// let options = EditOptions::new()
///     .target_file("gamesetup.a7s")
///     .compression_level(6)
///     .unwrap();
/// assert_eq!(options.level, 6);
/// ```
#[derive(Debug, Clone)]
pub struct EditOptions {
    /// Embedded file holding the tree.
    pub target_file: String,
    /// Encoding of directory entry names.
    pub name_encoding: NameEncoding,
    /// List being edited.
    pub schema: ListSchema,
    /// Compression level (0-9) used when re-compressing the payload.
    pub level: u32,
    /// Maximum decompressed payload size in bytes.
    pub max_payload_size: u64,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            target_file: GAME_SETUP_FILE.into(),
            name_encoding: NameEncoding::default(),
            schema: ListSchema::default(),
            level: 9,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl EditOptions {
    /// Creates options describing the observed save layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the embedded file to edit.
    pub fn target_file(mut self, name: impl Into<String>) -> Self {
        self.target_file = name.into();
        self
    }

    /// Sets the directory name encoding.
    pub fn name_encoding(mut self, encoding: NameEncoding) -> Self {
        self.name_encoding = encoding;
        self
    }

    /// Replaces the list schema.
    pub fn schema(mut self, schema: ListSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the declared item width.
    pub fn item_width(mut self, width: usize) -> Self {
        self.schema.item_width = width;
        self
    }

    /// Sets the compression level (strict validation).
    ///
    /// Valid values are 0-9.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if `level > 9`.
    pub fn compression_level(mut self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the maximum decompressed payload size.
    pub fn max_payload_size(mut self, bytes: u64) -> Self {
        self.max_payload_size = bytes;
        self
    }
}
