//! Container reading API.
//!
//! A resource container holds embedded files behind a chain of directory
//! blocks. This module validates the container magic, walks the chain and
//! pulls out the stored bytes of a named file.
//!
//! # Example
//!
//! ```rust,ignore
//! use rdasave::read::Container;
//!
//! let container = Container::open(std::fs::read("save.a7s")?)?;
//! for entry in container.entries()? {
//!     println!("{}: {} bytes", entry.name, entry.size);
//! }
//! let file = container.extract("gamesetup.a7s")?;
//! ```

mod container;
mod entry;

pub use container::{Blocks, Container};
pub use entry::{DirectoryBlock, EntryOffsets, ExtractedFile, FileEntry};
