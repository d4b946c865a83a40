//! IBX1 node structure and encoding.

use ibx_common::{BinaryReader, BinaryWriter};

use crate::number::{read_count, read_index, write_number};
use crate::{Error, Property, Result};

/// Marker byte that starts every encoded node.
const ELEMENT_MARKER: u8 = 0x00;

/// Deepest node nesting accepted when reading or building a document.
pub const MAX_DEPTH: usize = 256;

/// Sizes of the document tables, used to validate indices while reading.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableSizes {
    pub strings: usize,
    pub values: usize,
}

/// A node in the IBX1 tree.
///
/// Nodes own their properties and children; the tree has no shared or
/// back references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Index of the node name in the string table.
    pub name: u32,
    /// Properties in document order.
    pub properties: Vec<Property>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node with no properties or children.
    pub fn new(name: u32) -> Self {
        Self {
            name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a child node.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Write this node and its subtree in preorder.
    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        writer.write_u8(ELEMENT_MARKER);
        write_number(writer, u64::from(self.name));
        write_number(writer, self.properties.len() as u64);
        write_number(writer, self.children.len() as u64);

        for property in &self.properties {
            property.write(writer)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }

        Ok(())
    }

    /// Read a node and its subtree.
    pub(crate) fn read(reader: &mut BinaryReader<'_>, sizes: TableSizes) -> Result<Self> {
        Self::read_at_depth(reader, sizes, 1)
    }

    fn read_at_depth(reader: &mut BinaryReader<'_>, sizes: TableSizes, depth: usize) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(Error::NestingTooDeep { max: MAX_DEPTH });
        }

        let offset = reader.position();
        let tag = reader.read_u8()?;
        if tag != ELEMENT_MARKER {
            return Err(Error::MalformedNode { tag, offset });
        }

        let name = read_index(reader, "string", sizes.strings)?;
        let property_count = read_count(reader)?;
        let child_count = read_count(reader)?;

        // Every entry takes at least two bytes, so cap preallocation by what is left.
        let mut properties = Vec::with_capacity(property_count.min(reader.remaining() / 2));
        for _ in 0..property_count {
            properties.push(Property::read(reader, sizes.strings, sizes.values)?);
        }

        let mut children = Vec::with_capacity(child_count.min(reader.remaining() / 2));
        for _ in 0..child_count {
            children.push(Self::read_at_depth(reader, sizes, depth + 1)?);
        }

        Ok(Self {
            name,
            properties,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: TableSizes = TableSizes {
        strings: 8,
        values: 8,
    };

    fn encode(node: &Node) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        node.write(&mut writer).unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_leaf_with_property() {
        let node = Node::new(0).with_property(Property::new(0, 0));
        assert_eq!(encode(&node), vec![0x00, 0x00, 0x01, 0x00, 0x80, 0x00]);
    }

    #[test]
    fn test_properties_before_children() {
        let node = Node::new(1)
            .with_property(Property::new(2, 0))
            .with_child(Node::new(3))
            .with_property(Property::new(4, 1));

        assert_eq!(
            encode(&node),
            vec![
                0x00, 0x01, 0x02, 0x01, // marker, name 1, 2 props, 1 child
                0x82, 0x00, // prop name 2 -> value 0
                0x84, 0x01, // prop name 4 -> value 1
                0x00, 0x03, 0x00, 0x00, // child: name 3, no props, no children
            ]
        );
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let node = Node::new(0)
            .with_property(Property::new(5, 3))
            .with_property(Property::new(1, 3))
            .with_child(Node::new(2).with_child(Node::new(7).with_property(Property::new(6, 0))))
            .with_child(Node::new(4));

        let bytes = encode(&node);
        let mut reader = BinaryReader::new(&bytes);
        let decoded = Node::read(&mut reader, SIZES).unwrap();

        assert_eq!(decoded, node);
        assert!(reader.is_empty());
        assert_eq!(decoded.count(), 4);
        assert_eq!(decoded.depth(), 3);
    }

    #[test]
    fn test_bad_marker() {
        let mut reader = BinaryReader::new(&[0x01, 0x00, 0x00, 0x00]);
        assert!(matches!(
            Node::read(&mut reader, SIZES),
            Err(Error::MalformedNode { tag: 0x01, offset: 0 })
        ));
    }

    #[test]
    fn test_bad_child_marker_reports_offset() {
        let mut reader = BinaryReader::new(&[0x00, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x00]);
        assert!(matches!(
            Node::read(&mut reader, SIZES),
            Err(Error::MalformedNode { tag: 0x80, offset: 4 })
        ));
    }

    #[test]
    fn test_name_index_checked() {
        let mut reader = BinaryReader::new(&[0x00, 0x08, 0x00, 0x00]);
        assert!(matches!(
            Node::read(&mut reader, SIZES),
            Err(Error::IndexOutOfBounds { table: "string", index: 8, .. })
        ));
    }

    #[test]
    fn test_truncated_children() {
        // claims two children but holds one
        let mut reader = BinaryReader::new(&[0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00]);
        assert!(matches!(Node::read(&mut reader, SIZES), Err(Error::Common(_))));
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        // 0xffffffff properties claimed, no data
        let mut reader = BinaryReader::new(&[0x00, 0x00, 0xc0, 0xff, 0xff, 0xff, 0xff, 0x00]);
        assert!(matches!(Node::read(&mut reader, SIZES), Err(Error::Common(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let mut bytes = Vec::new();
        for _ in 0..=MAX_DEPTH {
            bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        }
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            Node::read(&mut reader, SIZES),
            Err(Error::NestingTooDeep { max: MAX_DEPTH })
        ));
    }
}
