//! Pipeline observation hooks.
//!
//! Every pipeline stage accepts a `&mut dyn Observer` and reports what it
//! walks over and what it changes. The default is [`NoObserver`], which
//! ignores everything; [`LogObserver`] forwards events to the `log` facade.
//!
//! # Example
//!
//! ```rust,ignore
//! use rdasave::observe::LogObserver;
//! use rdasave::read::Container;
//!
//! let container = Container::open(bytes)?;
//! let file = container.extract_with("gamesetup.a7s", &mut LogObserver)?;
//! ```

use crate::edit::Splice;

/// Which name table is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Tag id to name table.
    Tags,
    /// Attribute id to name table.
    Attributes,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tags => write!(f, "tag"),
            Self::Attributes => write!(f, "attribute"),
        }
    }
}

/// Receives pipeline events.
///
/// All methods default to doing nothing, so implementors only override
/// what they care about.
pub trait Observer {
    /// Called when a directory block header has been read.
    fn on_block(&mut self, offset: usize, file_count: u32) {
        let _ = (offset, file_count);
    }

    /// Called for each directory entry name that is compared.
    fn on_entry(&mut self, name: &str, matched: bool) {
        let _ = (name, matched);
    }

    /// Called after a name table has been read.
    fn on_table(&mut self, kind: TableKind, offset: usize, count: u32) {
        let _ = (kind, offset, count);
    }

    /// Called for every tag-open record.
    fn on_tag_open(&mut self, name: Option<&str>, offset: usize, depth: i32) {
        let _ = (name, offset, depth);
    }

    /// Called for every tag-close record.
    fn on_tag_close(&mut self, offset: usize, depth: i32) {
        let _ = (offset, depth);
    }

    /// Called for every attribute record.
    fn on_attribute(&mut self, name: Option<&str>, offset: usize, width: usize) {
        let _ = (name, offset, width);
    }

    /// Called when a requested item is already present and will not be inserted.
    fn on_item_skipped(&mut self, value: u32) {
        let _ = value;
    }

    /// Called before each splice is applied to a payload.
    fn on_splice(&mut self, splice: &Splice) {
        let _ = splice;
    }

    /// Called once a payload has been committed into the container.
    fn on_commit(&mut self, data_pointer: u64, size: u64) {
        let _ = (data_pointer, size);
    }
}

/// An observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl Observer for NoObserver {}

/// An observer that forwards events to the `log` crate.
///
/// Structural walk events go to `trace`, lookups and edits to `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_block(&mut self, offset: usize, file_count: u32) {
        log::debug!("directory block at {:#x}: {} entries", offset, file_count);
    }

    fn on_entry(&mut self, name: &str, matched: bool) {
        if matched {
            log::debug!("found entry '{}'", name);
        } else {
            log::trace!("entry '{}'", name);
        }
    }

    fn on_table(&mut self, kind: TableKind, offset: usize, count: u32) {
        log::debug!("{} table at {:#x}: {} names", kind, offset, count);
    }

    fn on_tag_open(&mut self, name: Option<&str>, offset: usize, depth: i32) {
        log::trace!("<{}> at {:#x}, depth {}", name.unwrap_or("?"), offset, depth);
    }

    fn on_tag_close(&mut self, offset: usize, depth: i32) {
        log::trace!("close at {:#x}, depth {}", offset, depth);
    }

    fn on_attribute(&mut self, name: Option<&str>, offset: usize, width: usize) {
        log::trace!(
            "attribute {} at {:#x} ({} bytes)",
            name.unwrap_or("?"),
            offset,
            width
        );
    }

    fn on_item_skipped(&mut self, value: u32) {
        log::debug!("item {:#x} already present, skipping", value);
    }

    fn on_splice(&mut self, splice: &Splice) {
        log::debug!(
            "{} {} bytes at {:#x}",
            splice.kind(),
            splice.len(),
            splice.offset()
        );
    }

    fn on_commit(&mut self, data_pointer: u64, size: u64) {
        log::debug!("payload committed at {:#x} ({} bytes)", data_pointer, size);
    }
}
