//! # rdasave
//!
//! A pure-Rust library for reading and patching `Resource File V2.2` save
//! containers.
//!
//! A save container is a directory-indexed resource file. One of its
//! embedded files, `gamesetup.a7s`, is a zlib-compressed tag/attribute tree
//! that lists the downloadable content active in the save. This crate
//! locates that file, decodes the tree, inserts new list items while keeping
//! every dependent offset and counter consistent, and appends the
//! recompressed result to the container.
//!
//! ## Quick Start
//!
//! ### Activating Items
//!
//! ```rust,no_run
//! use rdasave::catalog::Dlc;
//! use rdasave::{EditOptions, Result, SaveEditor};
//!
//! fn main() -> Result<()> {
//!     let mut editor = SaveEditor::open_path("Autosave.a7s", EditOptions::default())?;
//!
//!     for value in editor.active_items() {
//!         println!("active: {}", rdasave::catalog::describe(*value));
//!     }
//!
//!     let result = editor.activate(&[Dlc::S3HighLife.value(), Dlc::S4NewWorldRising.value()])?;
//!     println!("added {}, already active {}", result.added.len(), result.skipped.len());
//!
//!     if result.changed() {
//!         editor.write_path("Autosave_dlc_activated.a7s")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Running the Pipeline by Hand
//!
//! ```rust,no_run
//! use rdasave::read::Container;
//! use rdasave::tree::decode;
//! use rdasave::{Result, codec, edit, write};
//!
//! fn main() -> Result<()> {
//!     let container = Container::open(std::fs::read("Autosave.a7s")?)?;
//!     let file = container.extract("gamesetup.a7s")?;
//!
//!     let payload = codec::decompress(&file.data)?;
//!     let (tree, book) = decode(&payload, &Default::default())?;
//!     print!("{}", tree.render());
//!
//!     let outcome = edit::apply(&payload, &book, &[0xE541_0600], 4)?;
//!     let compressed = codec::compress(&outcome.payload, 9)?;
//!     let updated = write::commit(container.as_bytes(), &file.offsets, &compressed)?;
//!     std::fs::write("Autosave_dlc_activated.a7s", updated)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Directory chain walk and extraction | [`read`] |
//! | Decompression and compression | [`codec`] |
//! | Tree decoding and list bookkeeping | [`tree`] |
//! | Record insertion and offset fix-up | [`edit`] |
//! | Appending the payload to the container | [`write`] |
//!
//! Every stage works on in-memory buffers and accepts an
//! [`Observer`](observe::Observer) for diagnostics.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | The `rdasave` command line tool |

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod catalog;
pub mod codec;
pub mod edit;
pub mod error;
pub mod format;
pub mod observe;
pub mod options;
pub mod read;
pub mod tree;
pub mod write;

pub use error::{Error, Result};
pub use options::{EditOptions, ListSchema, NameEncoding};

pub use read::{Container, ExtractedFile, FileEntry};

pub use edit::{EditResult, PatchOutcome, SaveEditor};

pub use tree::{Bookkeeping, Tree};
