//! Arena-allocated tag/attribute nodes.

use crate::format::reader::uint_from_be;
use crate::format::tree::RECORD_HEADER_LEN;

/// Index of a node in a [`Tree`](super::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The implicit document node.
    pub const ROOT: NodeId = NodeId(0);

    /// Returns the arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tag: a named container of attributes and child tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    /// Element id from the record header.
    pub element_id: i32,
    /// Name from the tag table, `None` when the id is not listed.
    pub name: Option<String>,
    /// Enclosing tag, or the document node.
    pub parent: NodeId,
    /// Position of the tag-open record in the payload.
    pub offset: usize,
    /// Attributes and child tags in payload order.
    pub children: Vec<NodeId>,
}

/// An attribute: a named leaf holding raw content bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeNode {
    /// Element id from the record header.
    pub element_id: i32,
    /// Name from the attribute table, `None` when the id is not listed.
    pub name: Option<String>,
    /// Enclosing tag, or the document node.
    pub parent: NodeId,
    /// Position of the attribute record in the payload.
    pub offset: usize,
    /// Content bytes, without padding.
    pub content: Vec<u8>,
}

impl AttributeNode {
    /// Returns the content width in bytes.
    pub fn width(&self) -> usize {
        self.content.len()
    }

    /// Returns the position of the content bytes in the payload.
    pub fn content_offset(&self) -> usize {
        self.offset + RECORD_HEADER_LEN
    }

    /// Returns the content as a big-endian unsigned integer, if it fits.
    pub fn value(&self) -> Option<u64> {
        uint_from_be(&self.content)
    }
}

/// A node in the tree arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The implicit document node owning the top-level records.
    Document {
        /// Top-level attributes and tags.
        children: Vec<NodeId>,
    },
    /// A tag.
    Tag(TagNode),
    /// An attribute.
    Attribute(AttributeNode),
}

impl Node {
    /// Returns the node name, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Document { .. } => None,
            Node::Tag(tag) => tag.name.as_deref(),
            Node::Attribute(attr) => attr.name.as_deref(),
        }
    }

    /// Returns the element id; the document node has none.
    pub fn element_id(&self) -> Option<i32> {
        match self {
            Node::Document { .. } => None,
            Node::Tag(tag) => Some(tag.element_id),
            Node::Attribute(attr) => Some(attr.element_id),
        }
    }

    /// Returns the parent node; the document node has none.
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Document { .. } => None,
            Node::Tag(tag) => Some(tag.parent),
            Node::Attribute(attr) => Some(attr.parent),
        }
    }

    /// Returns the child list; attributes have none.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Document { children } => children,
            Node::Tag(tag) => &tag.children,
            Node::Attribute(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Node::Document { children } => Some(children),
            Node::Tag(tag) => Some(&mut tag.children),
            Node::Attribute(_) => None,
        }
    }

    /// Returns the attribute payload if this is an attribute.
    pub fn as_attribute(&self) -> Option<&AttributeNode> {
        match self {
            Node::Attribute(attr) => Some(attr),
            _ => None,
        }
    }

    /// Returns the tag if this is a tag.
    pub fn as_tag(&self) -> Option<&TagNode> {
        match self {
            Node::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(content: &[u8]) -> AttributeNode {
        AttributeNode {
            element_id: 32770,
            name: Some("DLC".into()),
            parent: NodeId::ROOT,
            offset: 40,
            content: content.to_vec(),
        }
    }

    #[test]
    fn test_attribute_value_is_big_endian() {
        let attr = attribute(&[0xE5, 0x41, 0x06, 0x00]);
        assert_eq!(attr.value(), Some(0xE541_0600));
        assert_eq!(attr.width(), 4);
        assert_eq!(attr.content_offset(), 48);
    }

    #[test]
    fn test_wide_attribute_has_no_value() {
        let attr = attribute(&[0xFF; 12]);
        assert_eq!(attr.value(), None);
    }

    #[test]
    fn test_node_accessors() {
        let node = Node::Attribute(attribute(&[1]));
        assert_eq!(node.name(), Some("DLC"));
        assert_eq!(node.element_id(), Some(32770));
        assert_eq!(node.parent(), Some(NodeId::ROOT));
        assert!(node.children().is_empty());
        assert!(node.as_tag().is_none());

        let document = Node::Document {
            children: vec![NodeId(1)],
        };
        assert_eq!(document.name(), None);
        assert_eq!(document.parent(), None);
        assert_eq!(document.children(), &[NodeId(1)]);
    }
}
