//! Save editing.
//!
//! This module inserts items into the list stored in the game-setup tree:
//! - [`Splice`] and [`SpliceBuilder`] describe ordered byte edits
//! - [`PayloadEditor`] applies them to a payload, copy-on-write
//! - [`Patch`] plans and applies an item insertion from decoded
//!   [`Bookkeeping`](crate::tree::Bookkeeping)
//! - [`SaveEditor`] runs the whole pipeline over a container
//!
//! # Example
//!
//! ```rust,ignore
//! use rdasave::{EditOptions, SaveEditor};
//! use rdasave::catalog::Dlc;
//!
//! let mut editor = SaveEditor::open_path("Autosave.a7s", EditOptions::default())?;
//! println!("{} items active", editor.active_items().len());
//!
//! let result = editor.activate(&[Dlc::S3HighLife.value(), Dlc::S4NewWorldRising.value()])?;
//! println!("added {}, already active {}", result.added.len(), result.skipped.len());
//! editor.write_path("Autosave_dlc_activated.a7s")?;
//! ```
//!
//! # Implementation Notes
//!
//! Activation:
//! 1. Skips items that are already in the list or repeated in the request
//! 2. Splices one record per new item in after the container's open record
//! 3. Rewrites the counter and moves both trailer table pointers
//! 4. Recompresses the payload and appends it to the container
//!
//! The original payload stays in the container; only the directory entry
//! is redirected to the appended copy.

mod editor;
mod operation;
mod patch;

pub use editor::{EditResult, PayloadEditor, SaveEditor};
pub use operation::{Splice, SpliceBuilder};
pub use patch::{Patch, PatchOutcome, apply, item_record};
