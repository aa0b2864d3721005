//! XML-like text rendering of a tree.

use std::fmt::Write;

use super::{Node, NodeId, Tree, display_name};

enum Step {
    Enter(NodeId, usize),
    Leave(NodeId, usize),
}

impl Tree {
    /// Renders the tree as indented XML-like text.
    ///
    /// Tags become `<Name>` ... `</Name>`, attributes become
    /// `<name>value</name>` with the big-endian content in hex. Unnamed
    /// nodes are written as `#<element id>`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut steps: Vec<Step> = self
            .children(self.root())
            .iter()
            .rev()
            .map(|&id| Step::Enter(id, 0))
            .collect();

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(id, depth) => match self.node(id) {
                    Some(Node::Tag(tag)) => {
                        let name = display_name(tag.name.as_deref(), tag.element_id);
                        let _ = writeln!(out, "{:indent$}<{}>", "", name, indent = depth * 2);
                        steps.push(Step::Leave(id, depth));
                        steps.extend(
                            tag.children
                                .iter()
                                .rev()
                                .map(|&child| Step::Enter(child, depth + 1)),
                        );
                    }
                    Some(Node::Attribute(attr)) => {
                        let name = display_name(attr.name.as_deref(), attr.element_id);
                        let _ = writeln!(
                            out,
                            "{:indent$}<{name}>{}</{name}>",
                            "",
                            hex(&attr.content),
                            indent = depth * 2,
                        );
                    }
                    Some(Node::Document { .. }) | None => {}
                },
                Step::Leave(id, depth) => {
                    if let Some(Node::Tag(tag)) = self.node(id) {
                        let name = display_name(tag.name.as_deref(), tag.element_id);
                        let _ = writeln!(out, "{:indent$}</{}>", "", name, indent = depth * 2);
                    }
                }
            }
        }
        out
    }
}

/// Formats content as a big-endian hex number without leading zeros, or as
/// raw hex bytes when it does not fit in 64 bits.
fn hex(content: &[u8]) -> String {
    match crate::format::reader::uint_from_be(content) {
        Some(value) => format!("{:x}", value),
        None => content.iter().fold(String::new(), |mut acc, b| {
            let _ = write!(acc, "{:02x}", b);
            acc
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{AttributeNode, NameTable, TagNode};

    #[test]
    fn test_render_nested() {
        let mut tree = Tree::new(NameTable::default(), NameTable::default());
        let game = tree.push(Node::Tag(TagNode {
            element_id: 1,
            name: Some("Game".into()),
            parent: NodeId::ROOT,
            offset: 0,
            children: Vec::new(),
        }));
        tree.push(Node::Attribute(AttributeNode {
            element_id: 32769,
            name: Some("DLC".into()),
            parent: game,
            offset: 8,
            content: vec![0xE5, 0x41, 0x06, 0x00],
        }));
        tree.push(Node::Tag(TagNode {
            element_id: 9,
            name: None,
            parent: game,
            offset: 24,
            children: Vec::new(),
        }));

        assert_eq!(
            tree.render(),
            "<Game>\n  <DLC>e5410600</DLC>\n  <#9>\n  </#9>\n</Game>\n"
        );
    }

    #[test]
    fn test_hex_wide_content() {
        assert_eq!(hex(&[0u8; 0]), "0");
        assert_eq!(hex(&[0x00, 0x0A]), "a");
        assert_eq!(hex(&[0x01; 9]), "010101010101010101");
    }

    #[test]
    fn test_render_empty_tree() {
        let tree = Tree::new(NameTable::default(), NameTable::default());
        assert_eq!(tree.render(), "");
    }
}
