//! # Node Header Layout
//!
//! Every node buffer handed out by the allocator begins with an 8-byte header.
//! The representation of a node can be recovered from this header alone,
//! without decoding the payload.
//!
//! ```text
//! Offset  Size  Field      Description
//! ------  ----  ---------  ------------------------------------------
//! 0       1     node_type  ShortLeaf / LongLeaf / InnerNode / IntLeaf
//! 1       1     width      Slot width (short leaves only, else 0)
//! 2       2     reserved
//! 4       4     count      Number of entries (little-endian)
//! ```

use eyre::{bail, ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::NODE_HEADER_SIZE;
use crate::storage::{Allocator, NodeRef};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    ShortLeaf = 0x01,
    LongLeaf = 0x02,
    InnerNode = 0x03,
    IntLeaf = 0x04,
}

impl NodeType {
    pub fn from_byte(b: u8) -> Result<Self> {
        Ok(match b {
            0x01 => NodeType::ShortLeaf,
            0x02 => NodeType::LongLeaf,
            0x03 => NodeType::InnerNode,
            0x04 => NodeType::IntLeaf,
            _ => bail!("unknown node type: {:02x}", b),
        })
    }

    pub fn is_leaf(self) -> bool {
        self != NodeType::InnerNode
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct NodeHeader {
    node_type: u8,
    width: u8,
    reserved: [u8; 2],
    count: U32,
}

const _: () = assert!(
    std::mem::size_of::<NodeHeader>() == NODE_HEADER_SIZE,
    "NodeHeader layout must match NODE_HEADER_SIZE"
);

impl NodeHeader {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type: node_type as u8,
            width: 0,
            reserved: [0; 2],
            count: U32::new(0),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ensure!(
            data.len() >= NODE_HEADER_SIZE,
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            NODE_HEADER_SIZE
        );

        Self::ref_from_bytes(&data[..NODE_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn from_bytes_mut(data: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            data.len() >= NODE_HEADER_SIZE,
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            NODE_HEADER_SIZE
        );

        Self::mut_from_bytes(&mut data[..NODE_HEADER_SIZE])
            .map_err(|e| eyre::eyre!("failed to read NodeHeader: {:?}", e))
    }

    pub fn write_to(&self, data: &mut [u8]) -> Result<()> {
        ensure!(
            data.len() >= NODE_HEADER_SIZE,
            "buffer too small for NodeHeader: {} < {}",
            data.len(),
            NODE_HEADER_SIZE
        );

        data[..NODE_HEADER_SIZE].copy_from_slice(self.as_bytes());
        Ok(())
    }

    pub fn node_type(&self) -> Result<NodeType> {
        NodeType::from_byte(self.node_type)
    }

    zerocopy_accessors! {
        width: u8,
        count: u32,
    }
}

/// Reads the representation tag of `node` from its header.
pub fn node_type_of<A: Allocator + ?Sized>(alloc: &A, node: NodeRef) -> Result<NodeType> {
    NodeHeader::from_bytes(alloc.translate(node)?)?.node_type()
}

pub(crate) fn expect_node_type<A: Allocator + ?Sized>(
    alloc: &A,
    node: NodeRef,
    expected: NodeType,
) -> Result<()> {
    let actual = node_type_of(alloc, node)?;
    ensure!(
        actual == expected,
        "expected {:?} node at {}, got {:?}",
        expected,
        node,
        actual
    );
    Ok(())
}

/// Allocates a node of `payload_len` zero bytes behind a fresh header.
pub(crate) fn create_node<A: Allocator + ?Sized>(
    alloc: &mut A,
    node_type: NodeType,
    payload_len: usize,
) -> Result<NodeRef> {
    let node = alloc.alloc(NODE_HEADER_SIZE + payload_len)?;
    NodeHeader::new(node_type).write_to(alloc.translate_mut(node)?)?;
    Ok(node)
}

pub(crate) fn node_parts(data: &[u8]) -> Result<(&NodeHeader, &[u8])> {
    let header = NodeHeader::from_bytes(data)?;
    Ok((header, &data[NODE_HEADER_SIZE..]))
}

pub(crate) fn node_parts_mut(data: &mut [u8]) -> Result<(&mut NodeHeader, &mut [u8])> {
    ensure!(
        data.len() >= NODE_HEADER_SIZE,
        "buffer too small for NodeHeader: {} < {}",
        data.len(),
        NODE_HEADER_SIZE
    );
    let (head, payload) = data.split_at_mut(NODE_HEADER_SIZE);
    Ok((NodeHeader::from_bytes_mut(head)?, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SlabAllocator;

    #[test]
    fn node_header_is_8_bytes() {
        assert_eq!(std::mem::size_of::<NodeHeader>(), 8);
    }

    #[test]
    fn node_type_from_byte() {
        assert_eq!(NodeType::from_byte(0x01).unwrap(), NodeType::ShortLeaf);
        assert_eq!(NodeType::from_byte(0x02).unwrap(), NodeType::LongLeaf);
        assert_eq!(NodeType::from_byte(0x03).unwrap(), NodeType::InnerNode);
        assert_eq!(NodeType::from_byte(0x04).unwrap(), NodeType::IntLeaf);
        assert!(NodeType::from_byte(0x00).is_err());
        assert!(NodeType::from_byte(0xFF).is_err());
    }

    #[test]
    fn header_count_is_little_endian() {
        let mut data = [0u8; NODE_HEADER_SIZE];
        let mut header = NodeHeader::new(NodeType::LongLeaf);
        header.set_count(0x0102_0304);
        header.write_to(&mut data).unwrap();

        assert_eq!(data[0], 0x02);
        assert_eq!(&data[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(NodeHeader::from_bytes(&data).unwrap().count(), 0x0102_0304);
    }

    #[test]
    fn header_width_is_a_single_byte() {
        let mut data = [0u8; NODE_HEADER_SIZE];
        let mut header = NodeHeader::new(NodeType::ShortLeaf);
        header.set_width(16);
        header.set_count(2);
        header.write_to(&mut data).unwrap();

        assert_eq!(data[1], 16);
        assert_eq!(&data[2..4], &[0, 0]);
        assert_eq!(NodeHeader::from_bytes(&data).unwrap().width(), 16);
    }

    #[test]
    fn node_type_is_recoverable_from_allocated_node() {
        let mut alloc = SlabAllocator::new();
        let node = create_node(&mut alloc, NodeType::InnerNode, 0).unwrap();

        assert_eq!(node_type_of(&alloc, node).unwrap(), NodeType::InnerNode);
        assert!(expect_node_type(&alloc, node, NodeType::InnerNode).is_ok());

        let result = expect_node_type(&alloc, node, NodeType::ShortLeaf);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expected ShortLeaf"));
    }

    #[test]
    fn from_bytes_rejects_short_buffer() {
        let result = NodeHeader::from_bytes(&[0u8; 4]);
        assert!(result.is_err());
    }
}
