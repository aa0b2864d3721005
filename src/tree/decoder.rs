//! Payload record scanner.

use crate::format::reader::{ByteCursor, read_u32_le_at, uint_from_be, uint_from_le};
use crate::format::tree::{
    ATTRIBUTE_ID_MIN, ATTRIBUTE_TABLE_POINTER_FROM_END, RECORD_HEADER_LEN,
    TAG_TABLE_POINTER_FROM_END, TRAILER_LEN,
};
use crate::format::content_padding;
use crate::observe::{NoObserver, Observer, TableKind};
use crate::options::ListSchema;
use crate::{Error, Result};

use super::{AttributeNode, NameTable, Node, NodeId, TagNode, Tree};

/// The table pointers stored in the last 16 bytes of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Position of the trailer (payload length minus 16).
    pub offset: usize,
    /// Tag table pointer.
    pub tag_table: u32,
    /// Attribute table pointer.
    pub attribute_table: u32,
}

impl Trailer {
    /// Reads the trailer of `payload`.
    pub fn read(payload: &[u8]) -> Result<Self> {
        let offset = payload.len().checked_sub(TRAILER_LEN).ok_or_else(|| {
            Error::corrupt_header(
                0usize,
                format!("payload of {} bytes has no trailer", payload.len()),
            )
        })?;
        let end = payload.len();
        Ok(Self {
            offset,
            tag_table: read_u32_le_at(payload, end - TAG_TABLE_POINTER_FROM_END)?,
            attribute_table: read_u32_le_at(payload, end - ATTRIBUTE_TABLE_POINTER_FROM_END)?,
        })
    }

    /// Position of the tag table pointer field.
    pub fn tag_table_field(&self) -> usize {
        self.offset + TRAILER_LEN - TAG_TABLE_POINTER_FROM_END
    }

    /// Position of the attribute table pointer field.
    pub fn attribute_table_field(&self) -> usize {
        self.offset + TRAILER_LEN - ATTRIBUTE_TABLE_POINTER_FROM_END
    }
}

/// The list counter attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterField {
    /// Position of the content bytes.
    pub offset: usize,
    /// Content width in bytes.
    pub width: usize,
    /// Stored count, read little-endian. `None` if wider than 8 bytes.
    pub value: Option<u64>,
}

/// Record shape of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemField {
    /// Element id of the item attribute.
    pub element_id: i32,
    /// Content width in bytes.
    pub width: usize,
}

/// Everything the patch engine needs to know about the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookkeeping {
    /// Payload trailer.
    pub trailer: Trailer,
    /// First tag named after the list container.
    pub container: Option<NodeId>,
    /// Position right after the container's tag-open record.
    pub insertion_point: Option<usize>,
    /// The counter directly under the container.
    pub counter: Option<CounterField>,
    /// Item record shape.
    ///
    /// Taken from the first existing item, or resolved from the attribute
    /// table and the declared width when the list is empty.
    pub item: Option<ItemField>,
    /// Values of the existing items, in payload order.
    pub items: Vec<u64>,
}

impl Bookkeeping {
    /// Returns `true` if `value` is already in the list.
    pub fn contains(&self, value: u64) -> bool {
        self.items.contains(&value)
    }
}

/// Decodes a payload into a tree.
pub fn decode(payload: &[u8], schema: &ListSchema) -> Result<(Tree, Bookkeeping)> {
    decode_with(payload, schema, &mut NoObserver)
}

/// Decodes a payload, reporting every record to `observer`.
///
/// # Errors
///
/// Returns [`Error::CorruptHeader`] when the trailer or a name table is
/// truncated, or when the record scan runs into the trailer before the
/// document is closed.
pub fn decode_with(
    payload: &[u8],
    schema: &ListSchema,
    observer: &mut dyn Observer,
) -> Result<(Tree, Bookkeeping)> {
    let trailer = Trailer::read(payload)?;
    let tag_offset = table_offset(trailer.tag_table, trailer.tag_table_field())?;
    let attribute_offset = table_offset(trailer.attribute_table, trailer.attribute_table_field())?;

    let tags = NameTable::read_at(payload, tag_offset)?;
    observer.on_table(TableKind::Tags, tag_offset, tags.len() as u32);
    let attributes = NameTable::read_at(payload, attribute_offset)?;
    observer.on_table(TableKind::Attributes, attribute_offset, attributes.len() as u32);

    let mut scanner = Scanner {
        cursor: ByteCursor::at(payload, 0),
        limit: trailer.offset,
        tree: Tree::new(tags, attributes),
        schema,
        unknown: 0,
        book: Bookkeeping {
            trailer,
            container: None,
            insertion_point: None,
            counter: None,
            item: None,
            items: Vec::new(),
        },
    };
    scanner.run(observer)?;
    scanner.finish()
}

fn table_offset(pointer: u32, field: usize) -> Result<usize> {
    usize::try_from(pointer)
        .map_err(|_| Error::corrupt_header(field, "table pointer out of range"))
}

struct Scanner<'a> {
    cursor: ByteCursor<'a>,
    limit: usize,
    tree: Tree,
    schema: &'a ListSchema,
    unknown: usize,
    book: Bookkeeping,
}

impl Scanner<'_> {
    fn run(&mut self, observer: &mut dyn Observer) -> Result<()> {
        let mut stack = vec![NodeId::ROOT];
        let mut depth: i32 = 0;

        while depth >= 0 {
            let start = self.cursor.position();
            if start + RECORD_HEADER_LEN > self.limit {
                return Err(Error::corrupt_header(
                    start,
                    format!("record scan reached the trailer at depth {}", depth),
                ));
            }
            let content_size = self.cursor.read_u32_le()?;
            let element_id = self.cursor.read_i32_le()?;
            let parent = stack.last().copied().unwrap_or(NodeId::ROOT);

            if element_id >= ATTRIBUTE_ID_MIN {
                self.attribute(start, content_size, element_id, parent, observer)?;
            } else if element_id > 0 {
                let name = self.tree.tag_names().get(element_id).map(str::to_owned);
                if name.is_none() {
                    self.unknown += 1;
                }
                observer.on_tag_open(name.as_deref(), start, depth);
                let is_container = self.book.container.is_none()
                    && name.as_deref() == Some(self.schema.container_tag.as_str());
                let id = self.tree.push(Node::Tag(TagNode {
                    element_id,
                    name,
                    parent,
                    offset: start,
                    children: Vec::new(),
                }));
                if is_container {
                    self.book.container = Some(id);
                    self.book.insertion_point = Some(self.cursor.position());
                }
                stack.push(id);
                depth += 1;
            } else {
                observer.on_tag_close(start, depth);
                depth -= 1;
                if depth >= 0 {
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    fn attribute(
        &mut self,
        start: usize,
        content_size: u32,
        element_id: i32,
        parent: NodeId,
        observer: &mut dyn Observer,
    ) -> Result<()> {
        let width = usize::try_from(content_size)
            .map_err(|_| Error::corrupt_header(start, "attribute size out of range"))?;
        let padded = width
            .checked_add(content_padding(width))
            .filter(|&len| self.cursor.position().saturating_add(len) <= self.limit)
            .ok_or_else(|| {
                Error::corrupt_header(
                    start,
                    format!("attribute of {} bytes runs into the trailer", width),
                )
            })?;
        let content = self.cursor.read_bytes(width)?.to_vec();
        self.cursor.skip(padded - width)?;

        let name = self
            .tree
            .attribute_names()
            .get(element_id)
            .map(str::to_owned);
        if name.is_none() {
            self.unknown += 1;
        }
        observer.on_attribute(name.as_deref(), start, width);

        if self.book.container == Some(parent) {
            self.track(name.as_deref(), start, element_id, &content);
        }

        self.tree.push(Node::Attribute(AttributeNode {
            element_id,
            name,
            parent,
            offset: start,
            content,
        }));
        Ok(())
    }

    fn track(&mut self, name: Option<&str>, start: usize, element_id: i32, content: &[u8]) {
        let Some(name) = name else {
            return;
        };
        if name == self.schema.counter_attribute {
            if self.book.counter.is_none() {
                self.book.counter = Some(CounterField {
                    offset: start + RECORD_HEADER_LEN,
                    width: content.len(),
                    value: uint_from_le(content),
                });
            }
        } else if name == self.schema.item_attribute {
            match self.book.item {
                None => {
                    self.book.item = Some(ItemField {
                        element_id,
                        width: content.len(),
                    });
                }
                Some(item) if item.width != content.len() => {
                    log::warn!(
                        "item at {:#x} is {} bytes wide, expected {}",
                        start,
                        content.len(),
                        item.width
                    );
                }
                Some(_) => {}
            }
            // values wider than 8 bytes cannot match a requested item
            if let Some(value) = uint_from_be(content) {
                self.book.items.push(value);
            }
        }
    }

    fn finish(mut self) -> Result<(Tree, Bookkeeping)> {
        if self.unknown > 0 {
            log::warn!(
                "{} records use ids missing from the name tables",
                self.unknown
            );
        }
        if self.book.container.is_some() && self.book.item.is_none() {
            self.book.item = self
                .tree
                .attribute_names()
                .id_of(&self.schema.item_attribute)
                .map(|id| ItemField {
                    element_id: i32::from(id),
                    width: self.schema.item_width,
                });
        }
        Ok((self.tree, self.book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: i32 = 1;
    const LIST: i32 = 2;
    const OTHER: i32 = 3;
    const COUNT: i32 = 32768;
    const DLC: i32 = 32769;
    const NAME: i32 = 32770;

    #[derive(Default)]
    struct Payload {
        body: Vec<u8>,
    }

    impl Payload {
        fn open(mut self, id: i32) -> Self {
            self.body.extend_from_slice(&0u32.to_le_bytes());
            self.body.extend_from_slice(&id.to_le_bytes());
            self
        }

        fn close(self) -> Self {
            self.open(0)
        }

        fn attr(mut self, id: i32, content: &[u8]) -> Self {
            self.body
                .extend_from_slice(&(content.len() as u32).to_le_bytes());
            self.body.extend_from_slice(&id.to_le_bytes());
            self.body.extend_from_slice(content);
            let padding = content_padding(content.len());
            self.body.extend(std::iter::repeat_n(0u8, padding));
            self
        }

        fn finish(self) -> Vec<u8> {
            let tags: &[(u16, &str)] = &[(1, "Game"), (2, "ActiveDLCs"), (3, "Other")];
            let attrs: &[(u16, &str)] = &[(32768, "count"), (32769, "DLC"), (32770, "Name")];
            let mut out = self.body;
            let tag_table = out.len() as u32;
            write_table(&mut out, tags);
            let attribute_table = out.len() as u32;
            write_table(&mut out, attrs);
            out.extend_from_slice(&tag_table.to_le_bytes());
            out.extend_from_slice(&attribute_table.to_le_bytes());
            out.extend_from_slice(&[0xAB; 8]);
            out
        }
    }

    fn write_table(out: &mut Vec<u8>, entries: &[(u16, &str)]) {
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        for (id, _) in entries {
            out.extend_from_slice(&id.to_le_bytes());
        }
        for (_, name) in entries {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
    }

    fn sample() -> Vec<u8> {
        Payload::default()
            .open(GAME)
            .attr(NAME, b"abc")
            .open(LIST)
            .attr(COUNT, &2u64.to_le_bytes())
            .attr(DLC, &0xE541_0600u32.to_be_bytes())
            .attr(DLC, &0x8361_0000u32.to_be_bytes())
            .close()
            .close()
            .close()
            .finish()
    }

    #[test]
    fn test_decode_structure() {
        let payload = sample();
        let (tree, _) = decode(&payload, &ListSchema::default()).unwrap();

        let game = tree.children(tree.root())[0];
        assert_eq!(tree.node(game).unwrap().name(), Some("Game"));
        let list = tree.find_tag("ActiveDLCs").unwrap();
        assert_eq!(tree.parent(list), Some(game));
        assert_eq!(tree.children(list).len(), 3);
        assert_eq!(tree.path(list), "Game/ActiveDLCs");

        let name = tree.node(tree.children(game)[0]).unwrap().as_attribute().unwrap();
        assert_eq!(name.content, b"abc");
    }

    #[test]
    fn test_bookkeeping() {
        let payload = sample();
        let (_, book) = decode(&payload, &ListSchema::default()).unwrap();

        // Game open (8) + Name attr (16) + ActiveDLCs open (8)
        assert_eq!(book.insertion_point, Some(32));
        let counter = book.counter.unwrap();
        assert_eq!(counter.offset, 40);
        assert_eq!(counter.width, 8);
        assert_eq!(counter.value, Some(2));
        assert_eq!(
            book.item,
            Some(ItemField {
                element_id: DLC,
                width: 4
            })
        );
        assert_eq!(book.items, vec![0xE541_0600, 0x8361_0000]);
        assert!(book.contains(0x8361_0000));
        assert_eq!(book.trailer.offset, payload.len() - 16);
    }

    #[test]
    fn test_empty_list_resolves_item_from_table() {
        let payload = Payload::default()
            .open(GAME)
            .open(LIST)
            .attr(COUNT, &0u64.to_le_bytes())
            .close()
            .close()
            .close()
            .finish();
        let schema = ListSchema::default();
        let (_, book) = decode(&payload, &schema).unwrap();
        assert!(book.items.is_empty());
        assert_eq!(
            book.item,
            Some(ItemField {
                element_id: DLC,
                width: schema.item_width
            })
        );
    }

    #[test]
    fn test_items_outside_container_ignored() {
        let payload = Payload::default()
            .open(GAME)
            .open(OTHER)
            .attr(DLC, &7u32.to_be_bytes())
            .close()
            .open(LIST)
            .attr(COUNT, &0u64.to_le_bytes())
            .close()
            .close()
            .close()
            .finish();
        let (_, book) = decode(&payload, &ListSchema::default()).unwrap();
        assert!(book.items.is_empty());
    }

    #[test]
    fn test_missing_container_leaves_bookkeeping_unset() {
        let payload = Payload::default()
            .open(GAME)
            .attr(COUNT, &1u64.to_le_bytes())
            .close()
            .close()
            .finish();
        let (tree, book) = decode(&payload, &ListSchema::default()).unwrap();
        assert_eq!(tree.len(), 3);
        assert!(book.container.is_none());
        assert!(book.insertion_point.is_none());
        assert!(book.counter.is_none());
        assert!(book.item.is_none());
    }

    #[test]
    fn test_unknown_ids_decode_unnamed() {
        let payload = Payload::default()
            .open(77)
            .attr(40000, &[1, 2, 3])
            .close()
            .close()
            .finish();
        let (tree, _) = decode(&payload, &ListSchema::default()).unwrap();
        let tag = tree.children(tree.root())[0];
        assert_eq!(tree.node(tag).unwrap().name(), None);
        assert_eq!(tree.path(tree.children(tag)[0]), "#77/#40000");
    }

    #[test]
    fn test_unterminated_document() {
        let payload = Payload::default().open(GAME).open(LIST).close().finish();
        let err = decode(&payload, &ListSchema::default()).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_attribute_running_into_trailer() {
        let mut body = Payload::default().open(GAME);
        body.body.extend_from_slice(&1000u32.to_le_bytes());
        body.body.extend_from_slice(&DLC.to_le_bytes());
        let payload = body.finish();
        assert!(decode(&payload, &ListSchema::default()).unwrap_err().is_format_error());
    }

    #[test]
    fn test_short_payload() {
        let err = decode(&[0u8; 10], &ListSchema::default()).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_table_pointer_outside_payload() {
        let mut payload = sample();
        let field = payload.len() - 16;
        payload[field..field + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode(&payload, &ListSchema::default()).unwrap_err().is_format_error());
    }

    #[test]
    fn test_observer_sees_records() {
        #[derive(Default)]
        struct Recorder {
            opens: Vec<Option<String>>,
            closes: usize,
            attributes: usize,
            tables: usize,
        }
        impl Observer for Recorder {
            fn on_table(&mut self, _: TableKind, _: usize, _: u32) {
                self.tables += 1;
            }
            fn on_tag_open(&mut self, name: Option<&str>, _: usize, _: i32) {
                self.opens.push(name.map(str::to_owned));
            }
            fn on_tag_close(&mut self, _: usize, _: i32) {
                self.closes += 1;
            }
            fn on_attribute(&mut self, _: Option<&str>, _: usize, _: usize) {
                self.attributes += 1;
            }
        }

        let mut recorder = Recorder::default();
        decode_with(&sample(), &ListSchema::default(), &mut recorder).unwrap();
        assert_eq!(recorder.tables, 2);
        assert_eq!(
            recorder.opens,
            vec![Some("Game".to_string()), Some("ActiveDLCs".to_string())]
        );
        assert_eq!(recorder.closes, 3);
        assert_eq!(recorder.attributes, 4);
    }
}
