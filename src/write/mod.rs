//! Container writing API.
//!
//! A modified payload is never written over the original one. It is
//! appended to the end of the container, the directory entry is pointed at
//! it, and the container's closing region is repeated after it.
//!
//! # Example
//!
//! ```rust,ignore
//! use rdasave::read::Container;
//! use rdasave::write::commit;
//!
//! let container = Container::open(bytes)?;
//! let file = container.extract("gamesetup.a7s")?;
//! let updated = commit(container.as_bytes(), &file.offsets, &new_compressed)?;
//! ```

mod commit;

pub use commit::{commit, commit_with};
