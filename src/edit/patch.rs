//! List item insertion.
//!
//! Adding items to the list touches three places of the payload, always in
//! this order:
//!
//! 1. one attribute record per new item, spliced in right after the
//!    container's tag-open record;
//! 2. the counter attribute, rewritten with the new item count;
//! 3. both trailer table pointers, moved by the number of inserted bytes.

use std::collections::HashSet;

use crate::format::content_padding;
use crate::format::tree::COUNTER_WIDTH;
use crate::observe::{NoObserver, Observer};
use crate::tree::{Bookkeeping, ItemField};
use crate::{Error, Result};

use super::editor::PayloadEditor;
use super::operation::SpliceBuilder;

/// The result of patching a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The patched payload; the unmodified payload when nothing was added.
    pub payload: Vec<u8>,
    /// Items inserted, in request order.
    pub added: Vec<u32>,
    /// Requested items that were already present or repeated.
    pub skipped: Vec<u32>,
    /// Total number of bytes inserted.
    pub inserted_bytes: usize,
}

impl PatchOutcome {
    /// Returns `true` if the payload was changed.
    pub fn is_modified(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Inserts `items` into the list described by `book`.
///
/// `item_width` is the width the caller encodes items with; the list must
/// record the same width. The counter is rewritten as the number of item
/// records found plus the number added, so a stored count that disagrees
/// with the list is replaced.
///
/// # Errors
///
/// Returns [`Error::Schema`] when `item_width` differs from the recorded
/// item width, and in every case listed on [`Patch::apply_with`].
pub fn apply(
    payload: &[u8],
    book: &Bookkeeping,
    items: &[u32],
    item_width: usize,
) -> Result<PatchOutcome> {
    Patch::new(book)
        .declared_width(item_width)
        .apply_with(payload, items, &mut NoObserver)
}

/// A configured list patch.
///
/// # Example
///
/// ```rust,ignore
/// use rdasave::edit::Patch;
/// use rdasave::tree::decode;
///
/// let (_, book) = decode(&payload, &Default::default())?;
/// let outcome = Patch::new(&book).declared_width(4).apply(&payload, &[0xE541_0600])?;
/// assert_eq!(outcome.added.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Patch<'a> {
    book: &'a Bookkeeping,
    declared_width: Option<usize>,
}

impl<'a> Patch<'a> {
    /// Creates a patch for the list described by `book`.
    pub fn new(book: &'a Bookkeeping) -> Self {
        Self {
            book,
            declared_width: None,
        }
    }

    /// Requires the list items to be `width` bytes wide.
    pub fn declared_width(mut self, width: usize) -> Self {
        self.declared_width = Some(width);
        self
    }

    /// Inserts `items`, skipping those already present.
    pub fn apply(&self, payload: &[u8], items: &[u32]) -> Result<PatchOutcome> {
        self.apply_with(payload, items, &mut NoObserver)
    }

    /// Inserts `items`, reporting skips and splices to `observer`.
    ///
    /// The counter is not incremented from its stored value. It is rewritten
    /// as the number of item records in the list plus the number added, and
    /// a stored value that disagrees is logged as a warning and replaced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] when the container, counter or item shape
    /// is unknown, when the counter is not 8 bytes wide, when the item width
    /// differs from the declared one, or when a value does not fit the item
    /// width. Nothing is produced on failure.
    pub fn apply_with(
        &self,
        payload: &[u8],
        items: &[u32],
        observer: &mut dyn Observer,
    ) -> Result<PatchOutcome> {
        let insertion_point = self
            .book
            .insertion_point
            .ok_or_else(|| Error::schema("list container not found"))?;
        let counter = self
            .book
            .counter
            .ok_or_else(|| Error::schema("list counter not found"))?;
        let item = self
            .book
            .item
            .ok_or_else(|| Error::schema("item attribute id is unknown"))?;

        if counter.width != COUNTER_WIDTH {
            return Err(Error::schema(format!(
                "counter is {} bytes wide, expected {}",
                counter.width, COUNTER_WIDTH
            )));
        }
        if let Some(width) = self.declared_width.filter(|&width| width != item.width) {
            return Err(Error::schema(format!(
                "items are {} bytes wide, declared width is {}",
                item.width, width
            )));
        }

        let mut added = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();
        for &value in items {
            if self.book.contains(u64::from(value)) || !seen.insert(value) {
                observer.on_item_skipped(value);
                skipped.push(value);
                continue;
            }
            check_fits(value, item.width)?;
            added.push(value);
        }

        if added.is_empty() {
            return Ok(PatchOutcome {
                payload: payload.to_vec(),
                added,
                skipped,
                inserted_bytes: 0,
            });
        }

        let existing = self.book.items.len() as u64;
        if counter.value != Some(existing) {
            log::warn!(
                "counter holds {:?} but the list has {} items; rewriting from the item count",
                counter.value,
                existing
            );
        }

        let mut plan = SpliceBuilder::new();
        let mut point = insertion_point;
        for &value in &added {
            let record = item_record(item, value);
            let len = record.len();
            plan = plan.insert(point, record);
            point += len;
        }
        let inserted = plan.growth();
        let shift = |offset: usize| {
            if offset >= insertion_point {
                offset + inserted
            } else {
                offset
            }
        };

        let new_count = existing + added.len() as u64;
        plan = plan.overwrite(shift(counter.offset), new_count.to_le_bytes());

        let trailer = &self.book.trailer;
        let delta = u32::try_from(inserted)
            .map_err(|_| Error::schema("inserted records exceed the table pointer range"))?;
        let moved = |pointer: u32| {
            pointer
                .checked_add(delta)
                .ok_or_else(|| Error::schema(format!("table pointer {:#x} overflows", pointer)))
        };
        plan = plan
            .overwrite(
                shift(trailer.tag_table_field()),
                moved(trailer.tag_table)?.to_le_bytes(),
            )
            .overwrite(
                shift(trailer.attribute_table_field()),
                moved(trailer.attribute_table)?.to_le_bytes(),
            );

        let mut editor = PayloadEditor::new(payload);
        for splice in plan.build() {
            observer.on_splice(&splice);
            editor.apply(&splice)?;
        }

        Ok(PatchOutcome {
            payload: editor.into_bytes(),
            added,
            skipped,
            inserted_bytes: inserted,
        })
    }
}

/// Encodes one item attribute record.
///
/// Layout: content width (`u32` LE), element id (`i32` LE), the value
/// big-endian in `width` bytes, zero padding to a multiple of 8.
pub fn item_record(item: ItemField, value: u32) -> Vec<u8> {
    let width = item.width;
    let mut record = Vec::with_capacity(8 + width + content_padding(width));
    record.extend_from_slice(&(width as u32).to_le_bytes());
    record.extend_from_slice(&item.element_id.to_le_bytes());

    let be = value.to_be_bytes();
    if width >= be.len() {
        record.resize(record.len() + width - be.len(), 0);
        record.extend_from_slice(&be);
    } else {
        record.extend_from_slice(&be[be.len() - width..]);
    }
    record.resize(record.len() + content_padding(width), 0);
    record
}

fn check_fits(value: u32, width: usize) -> Result<()> {
    let bits = width.saturating_mul(8);
    if bits < 32 && u64::from(value) >> bits != 0 {
        return Err(Error::schema(format!(
            "item {:#x} does not fit in {} bytes",
            value, width
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::Splice;
    use crate::format::reader::{read_u32_le_at, read_u64_le_at};
    use crate::tree::{CounterField, NodeId, Trailer};

    const DLC: i32 = 32769;

    fn kinds(splices: &[Splice]) -> Vec<&'static str> {
        splices.iter().map(Splice::kind).collect()
    }

    /// Open ActiveDLCs, count=1, DLC=0x0a, close; then 8 bytes of table
    /// stand-in and the 16-byte trailer.
    fn fixture() -> (Vec<u8>, Bookkeeping) {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&2i32.to_le_bytes());
        payload.extend_from_slice(&8u32.to_le_bytes());
        payload.extend_from_slice(&32768i32.to_le_bytes());
        payload.extend_from_slice(&1u64.to_le_bytes());
        payload.extend_from_slice(&4u32.to_le_bytes());
        payload.extend_from_slice(&DLC.to_le_bytes());
        payload.extend_from_slice(&[0, 0, 0, 0x0a, 0, 0, 0, 0]);
        payload.extend_from_slice(&[0u8; 8]);
        payload.extend_from_slice(&[0xCC; 8]);
        let trailer_offset = payload.len();
        payload.extend_from_slice(&48u32.to_le_bytes());
        payload.extend_from_slice(&52u32.to_le_bytes());
        payload.extend_from_slice(&[0xAB; 8]);

        let book = Bookkeeping {
            trailer: Trailer {
                offset: trailer_offset,
                tag_table: 48,
                attribute_table: 52,
            },
            container: Some(NodeId::ROOT),
            insertion_point: Some(8),
            counter: Some(CounterField {
                offset: 16,
                width: 8,
                value: Some(1),
            }),
            item: Some(ItemField {
                element_id: DLC,
                width: 4,
            }),
            items: vec![0x0a],
        };
        (payload, book)
    }

    #[test]
    fn test_item_record_layout() {
        let record = item_record(
            ItemField {
                element_id: DLC,
                width: 4,
            },
            0xE541_0600,
        );
        assert_eq!(record.len(), 16);
        assert_eq!(&record[..4], &4u32.to_le_bytes());
        assert_eq!(&record[4..8], &DLC.to_le_bytes());
        assert_eq!(&record[8..12], &[0xE5, 0x41, 0x06, 0x00]);
        assert_eq!(&record[12..], &[0; 4]);
    }

    #[test]
    fn test_item_record_wide_and_narrow() {
        let wide = item_record(
            ItemField {
                element_id: DLC,
                width: 8,
            },
            0x0102_0304,
        );
        assert_eq!(wide.len(), 16);
        assert_eq!(&wide[8..], &[0, 0, 0, 0, 1, 2, 3, 4]);

        let narrow = item_record(
            ItemField {
                element_id: DLC,
                width: 2,
            },
            0x0102,
        );
        assert_eq!(narrow.len(), 16);
        assert_eq!(&narrow[8..10], &[1, 2]);
    }

    #[test]
    fn test_insert_two_items() {
        let (payload, book) = fixture();
        let outcome = apply(&payload, &book, &[0x0b, 0x0c], 4).unwrap();

        assert_eq!(outcome.added, vec![0x0b, 0x0c]);
        assert_eq!(outcome.inserted_bytes, 32);
        assert_eq!(outcome.payload.len(), payload.len() + 32);

        let out = &outcome.payload;
        // new records sit right after the container open, in request order
        assert_eq!(&out[16..20], &[0, 0, 0, 0x0b]);
        assert_eq!(&out[32..36], &[0, 0, 0, 0x0c]);
        // counter moved by 32 bytes
        assert_eq!(read_u64_le_at(out, 16 + 32).unwrap(), 3);
        // trailer pointers moved by 32
        let trailer = out.len() - 16;
        assert_eq!(read_u32_le_at(out, trailer).unwrap(), 48 + 32);
        assert_eq!(read_u32_le_at(out, trailer + 4).unwrap(), 52 + 32);
        assert_eq!(&out[trailer + 8..], &[0xAB; 8]);
        // everything before the insertion point is untouched
        assert_eq!(&out[..8], &payload[..8]);
    }

    #[test]
    fn test_present_item_is_noop() {
        let (payload, book) = fixture();
        let outcome = apply(&payload, &book, &[0x0a], 4).unwrap();
        assert!(!outcome.is_modified());
        assert_eq!(outcome.payload, payload);
        assert_eq!(outcome.skipped, vec![0x0a]);
    }

    #[test]
    fn test_repeated_request_inserted_once() {
        let (payload, book) = fixture();
        let outcome = apply(&payload, &book, &[0x0b, 0x0a, 0x0b], 4).unwrap();
        assert_eq!(outcome.added, vec![0x0b]);
        assert_eq!(outcome.skipped, vec![0x0a, 0x0b]);
        assert_eq!(read_u64_le_at(&outcome.payload, 32).unwrap(), 2);
    }

    #[test]
    fn test_empty_request() {
        let (payload, book) = fixture();
        let outcome = apply(&payload, &book, &[], 4).unwrap();
        assert_eq!(outcome.payload, payload);
        assert_eq!(outcome.inserted_bytes, 0);
    }

    #[test]
    fn test_missing_counter_is_schema_error() {
        let (payload, mut book) = fixture();
        book.counter = None;
        assert!(apply(&payload, &book, &[1], 4).unwrap_err().is_schema_error());
    }

    #[test]
    fn test_missing_container_is_schema_error() {
        let (payload, mut book) = fixture();
        book.insertion_point = None;
        assert!(apply(&payload, &book, &[1], 4).unwrap_err().is_schema_error());
    }

    #[test]
    fn test_counter_width_must_be_eight() {
        let (payload, mut book) = fixture();
        if let Some(counter) = book.counter.as_mut() {
            counter.width = 4;
        }
        assert!(apply(&payload, &book, &[1], 4).unwrap_err().is_schema_error());
    }

    #[test]
    fn test_declared_width_mismatch() {
        let (payload, book) = fixture();
        let err = Patch::new(&book)
            .declared_width(8)
            .apply(&payload, &[1])
            .unwrap_err();
        assert!(err.is_schema_error());
        assert!(Patch::new(&book).declared_width(4).apply(&payload, &[1]).is_ok());
    }

    #[test]
    fn test_free_apply_checks_item_width() {
        let (payload, book) = fixture();
        let err = apply(&payload, &book, &[0x0b], 8).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        let err = apply(&payload, &book, &[0x0b], 2).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_counter_rewritten_from_item_count() {
        let (mut payload, mut book) = fixture();
        // stored counter claims 9 items; the list holds one
        payload[16..24].copy_from_slice(&9u64.to_le_bytes());
        if let Some(counter) = book.counter.as_mut() {
            counter.value = Some(9);
        }
        let outcome = apply(&payload, &book, &[0x0b], 4).unwrap();
        assert_eq!(read_u64_le_at(&outcome.payload, 16 + 16).unwrap(), 2);
    }

    #[test]
    fn test_value_wider_than_item() {
        let (payload, mut book) = fixture();
        book.item = Some(ItemField {
            element_id: DLC,
            width: 2,
        });
        assert!(apply(&payload, &book, &[0x1_0000], 2).unwrap_err().is_schema_error());
        assert!(apply(&payload, &book, &[0xFFFF], 2).is_ok());
    }

    #[test]
    fn test_splice_order_reported() {
        #[derive(Default)]
        struct Splices(Vec<Splice>);
        impl Observer for Splices {
            fn on_splice(&mut self, splice: &Splice) {
                self.0.push(splice.clone());
            }
        }

        let (payload, book) = fixture();
        let mut observer = Splices::default();
        Patch::new(&book)
            .apply_with(&payload, &[0x0b, 0x0c], &mut observer)
            .unwrap();
        assert_eq!(
            kinds(&observer.0),
            ["insert", "insert", "overwrite", "overwrite", "overwrite"]
        );
        assert_eq!(observer.0[1].offset(), 24);
    }
}
