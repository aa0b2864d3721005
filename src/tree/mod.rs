//! The game-setup tag/attribute tree.
//!
//! The decompressed payload is a flat stream of records. Each record starts
//! with a `u32` content size and an `i32` element id; the id range decides
//! what the record is:
//!
//! | Element id        | Record       |
//! |-------------------|--------------|
//! | `>= 32768`        | attribute    |
//! | `1..=32767`       | tag open     |
//! | `<= 0`            | tag close    |
//!
//! Names come from two tables located through the 16-byte payload trailer.
//! [`decode`] turns the stream into an arena [`Tree`] and collects the
//! [`Bookkeeping`] the patch engine needs.

mod decoder;
mod names;
mod node;
mod render;

pub use decoder::{Bookkeeping, CounterField, ItemField, Trailer, decode, decode_with};
pub use names::NameTable;
pub use node::{AttributeNode, Node, NodeId, TagNode};

/// A decoded payload tree.
///
/// Nodes live in an arena in payload order. Index 0 is the implicit
/// document node that owns the top-level records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    tags: NameTable,
    attributes: NameTable,
}

impl Tree {
    pub(crate) fn new(tags: NameTable, attributes: NameTable) -> Self {
        Self {
            nodes: vec![Node::Document {
                children: Vec::new(),
            }],
            tags,
            attributes,
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(children) = node
            .parent()
            .and_then(|parent| self.nodes.get_mut(parent.0))
            .and_then(Node::children_mut)
        {
            children.push(id);
        }
        self.nodes.push(node);
        id
    }

    /// Returns the document node id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Returns the children of a node, in payload order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], Node::children)
    }

    /// Returns the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Returns the number of nodes, including the document node.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the payload held no records.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterates over all nodes in payload order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Finds the first tag named `name` in payload order.
    pub fn find_tag(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| matches!(node, Node::Tag(tag) if tag.name.as_deref() == Some(name)))
            .map(|(id, _)| id)
    }

    /// Returns the attributes named `name` directly under `parent`.
    pub fn attributes_named<'a>(
        &'a self,
        parent: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = &'a AttributeNode> + 'a {
        self.children(parent)
            .iter()
            .filter_map(|&id| self.node(id).and_then(Node::as_attribute))
            .filter(move |attr| attr.name.as_deref() == Some(name))
    }

    /// Returns the slash-separated names from the document node down to `id`.
    ///
    /// Unnamed nodes appear as `#<element id>`.
    pub fn path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                break;
            };
            if let Some(element_id) = node.element_id() {
                segments.push(display_name(node.name(), element_id));
            }
            current = node.parent();
        }
        segments.reverse();
        segments.join("/")
    }

    /// Returns the tag name table.
    pub fn tag_names(&self) -> &NameTable {
        &self.tags
    }

    /// Returns the attribute name table.
    pub fn attribute_names(&self) -> &NameTable {
        &self.attributes
    }
}

pub(crate) fn display_name(name: Option<&str>, element_id: i32) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("#{}", element_id),
    }
}
