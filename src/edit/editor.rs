//! Save editor and copy-on-write payload editing.

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::codec::{BlobCodec, ZlibCodec};
use crate::observe::{NoObserver, Observer};
use crate::options::EditOptions;
use crate::read::{Container, ExtractedFile, FileEntry};
use crate::tree::{self, Bookkeeping, Tree};
use crate::{Error, Result, write};

use super::operation::Splice;
use super::patch::Patch;

/// Applies splices to a payload, copying it on the first change.
#[derive(Debug, Clone)]
pub struct PayloadEditor<'a> {
    buffer: Cow<'a, [u8]>,
}

impl<'a> PayloadEditor<'a> {
    /// Creates an editor over `payload`.
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            buffer: Cow::Borrowed(payload),
        }
    }

    /// Returns the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns `true` once any splice has been applied.
    pub fn is_modified(&self) -> bool {
        matches!(self.buffer, Cow::Owned(_))
    }

    /// Applies one splice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptHeader`] if the splice reaches past the end
    /// of the buffer. The buffer is unchanged on error.
    pub fn apply(&mut self, splice: &Splice) -> Result<()> {
        let len = self.buffer.len();
        match splice {
            Splice::Insert { offset, bytes } => {
                if *offset > len {
                    return Err(out_of_bounds(splice, len));
                }
                self.buffer
                    .to_mut()
                    .splice(*offset..*offset, bytes.iter().copied());
            }
            Splice::Overwrite { offset, bytes } => {
                let end = offset
                    .checked_add(bytes.len())
                    .filter(|&end| end <= len)
                    .ok_or_else(|| out_of_bounds(splice, len))?;
                self.buffer.to_mut()[*offset..end].copy_from_slice(bytes);
            }
        }
        Ok(())
    }

    /// Returns the edited bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_owned()
    }
}

fn out_of_bounds(splice: &Splice, len: usize) -> Error {
    Error::corrupt_header(
        splice.offset(),
        format!(
            "{} of {} bytes outside a {}-byte payload",
            splice.kind(),
            splice.len(),
            len
        ),
    )
}

/// Result of an activation.
#[must_use = "edit result should be checked to verify which items were added"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResult {
    /// Items inserted, in request order.
    pub added: Vec<u32>,
    /// Requested items that were already active.
    pub skipped: Vec<u32>,
    /// Bytes inserted into the decompressed payload.
    pub inserted_bytes: usize,
    /// Size of the newly compressed payload; zero when nothing changed.
    pub compressed_size: u64,
    /// Size of the resulting container.
    pub container_size: u64,
}

impl EditResult {
    /// Returns `true` if the container was changed.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// An editor for the item list of one save container.
///
/// Opening runs the read side of the pipeline eagerly: the target file is
/// located, decompressed and decoded, so every format error surfaces
/// before anything is changed. [`activate`](Self::activate) then patches,
/// recompresses and commits, and the editor moves on to the new state.
///
/// # Example
///
/// ```rust,no_run
/// use rdasave::{EditOptions, SaveEditor};
///
/// # fn main() -> rdasave::Result<()> {
/// let mut editor = SaveEditor::open_path("Autosave.a7s", EditOptions::default())?;
/// let result = editor.activate(&[0xE541_0600, 0x8361_0000])?;
/// if result.changed() {
///     editor.write_path("Autosave_dlc_activated.a7s")?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SaveEditor {
    container: Container,
    file: ExtractedFile,
    payload: Vec<u8>,
    tree: Tree,
    book: Bookkeeping,
    options: EditOptions,
}

impl SaveEditor {
    /// Opens a container held in memory.
    pub fn open(bytes: impl Into<Vec<u8>>, options: EditOptions) -> Result<Self> {
        Self::open_with(bytes, options, &mut NoObserver)
    }

    /// Opens a container file.
    pub fn open_path(path: impl AsRef<Path>, options: EditOptions) -> Result<Self> {
        let container = Container::open_path(path, options.name_encoding)?;
        Self::from_container(container, options, &mut NoObserver)
    }

    /// Opens a container held in memory, reporting to `observer`.
    pub fn open_with(
        bytes: impl Into<Vec<u8>>,
        options: EditOptions,
        observer: &mut dyn Observer,
    ) -> Result<Self> {
        let container = Container::open_with_encoding(bytes, options.name_encoding)?;
        Self::from_container(container, options, observer)
    }

    fn from_container(
        container: Container,
        options: EditOptions,
        observer: &mut dyn Observer,
    ) -> Result<Self> {
        let file = container.extract_with(&options.target_file, observer)?;
        let payload = codec(&options).decompress(&file.data)?;
        let (tree, book) = tree::decode_with(&payload, &options.schema, observer)?;
        Ok(Self {
            container,
            file,
            payload,
            tree,
            book,
            options,
        })
    }

    /// Returns the container.
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Returns the directory entry of the edited file.
    pub fn entry(&self) -> &FileEntry {
        &self.file.entry
    }

    /// Returns the stored (compressed) bytes of the edited file.
    pub fn compressed(&self) -> &[u8] {
        &self.file.data
    }

    /// Returns the decompressed payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the decoded tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Returns the list bookkeeping.
    pub fn bookkeeping(&self) -> &Bookkeeping {
        &self.book
    }

    /// Returns the values currently in the list.
    pub fn active_items(&self) -> &[u64] {
        &self.book.items
    }

    /// Returns the options the editor was opened with.
    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Inserts `items` into the list and commits the new payload.
    pub fn activate(&mut self, items: &[u32]) -> Result<EditResult> {
        self.activate_with(items, &mut NoObserver)
    }

    /// Inserts `items`, reporting every stage to `observer`.
    ///
    /// Items already in the list are skipped. When nothing is left to add
    /// the container is left byte-identical. On error the editor keeps its
    /// previous state.
    pub fn activate_with(
        &mut self,
        items: &[u32],
        observer: &mut dyn Observer,
    ) -> Result<EditResult> {
        let outcome = Patch::new(&self.book)
            .declared_width(self.options.schema.item_width)
            .apply_with(&self.payload, items, observer)?;
        if !outcome.is_modified() {
            return Ok(EditResult {
                skipped: outcome.skipped,
                container_size: self.container.len() as u64,
                ..EditResult::default()
            });
        }

        let compressed = codec(&self.options).compress(&outcome.payload)?;
        let bytes = write::commit_with(
            self.container.as_bytes(),
            &self.file.offsets,
            &compressed,
            observer,
        )?;

        let container = Container::open_with_encoding(bytes, self.options.name_encoding)?;
        let file = container.extract(&self.options.target_file)?;
        let (tree, book) = tree::decode(&outcome.payload, &self.options.schema)?;

        let result = EditResult {
            added: outcome.added,
            skipped: outcome.skipped,
            inserted_bytes: outcome.inserted_bytes,
            compressed_size: compressed.len() as u64,
            container_size: container.len() as u64,
        };
        self.container = container;
        self.file = file;
        self.payload = outcome.payload;
        self.tree = tree;
        self.book = book;
        Ok(result)
    }

    /// Returns the current container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.container.as_bytes()
    }

    /// Consumes the editor and returns the container bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.container.into_bytes()
    }

    /// Writes the current container to `path`.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;
        file.write_all(self.container.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

fn codec(options: &EditOptions) -> ZlibCodec {
    ZlibCodec::new(options.level).max_output(options.max_payload_size)
}
