//! # Integer Leaf
//!
//! Fixed 8-byte little-endian slots. Integer leaves back the row lists of the
//! secondary index and the key-index lists produced by auto-enumeration.
//!
//! ```text
//! +------------------+-----------+-----------+-----+
//! | NodeHeader (8B)  | u64 [0]   | u64 [1]   | ... |
//! +------------------+-----------+-----------+-----+
//! ```

use std::ops::ControlFlow;

use eyre::{ensure, Result};
use zerocopy::little_endian::U64;
use zerocopy::FromBytes;

use super::header::{create_node, expect_node_type, node_parts, node_parts_mut, NodeType};
use crate::config::{INT_SLOT_SIZE, NODE_HEADER_SIZE};
use crate::storage::{Allocator, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLeaf {
    node: NodeRef,
}

fn slots(data: &[u8]) -> Result<&[U64]> {
    let (header, payload) = node_parts(data)?;
    let len = header.count() as usize * INT_SLOT_SIZE;
    ensure!(
        payload.len() >= len,
        "int leaf truncated: {} bytes for {} slots",
        payload.len(),
        header.count()
    );
    <[U64]>::ref_from_bytes(&payload[..len])
        .map_err(|e| eyre::eyre!("failed to read int leaf slots: {:?}", e))
}

fn slots_mut(data: &mut [u8]) -> Result<&mut [U64]> {
    let (header, payload) = node_parts_mut(data)?;
    let len = header.count() as usize * INT_SLOT_SIZE;
    ensure!(
        payload.len() >= len,
        "int leaf truncated: {} bytes for {} slots",
        payload.len(),
        header.count()
    );
    <[U64]>::mut_from_bytes(&mut payload[..len])
        .map_err(|e| eyre::eyre!("failed to read int leaf slots: {:?}", e))
}

impl IntLeaf {
    pub fn create<A: Allocator>(alloc: &mut A) -> Result<Self> {
        let node = create_node(alloc, NodeType::IntLeaf, 0)?;
        Ok(Self { node })
    }

    pub fn open<A: Allocator>(alloc: &A, node: NodeRef) -> Result<Self> {
        expect_node_type(alloc, node, NodeType::IntLeaf)?;
        Ok(Self { node })
    }

    pub fn node_ref(&self) -> NodeRef {
        self.node
    }

    pub fn len<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        Ok(slots(alloc.translate(self.node)?)?.len())
    }

    pub fn is_empty<A: Allocator>(&self, alloc: &A) -> Result<bool> {
        Ok(self.len(alloc)? == 0)
    }

    pub fn get<A: Allocator>(&self, alloc: &A, ndx: usize) -> Result<u64> {
        let slots = slots(alloc.translate(self.node)?)?;
        ensure!(
            ndx < slots.len(),
            "int leaf index {} out of bounds (count={})",
            ndx,
            slots.len()
        );
        Ok(slots[ndx].get())
    }

    pub fn set<A: Allocator>(&self, alloc: &mut A, ndx: usize, value: u64) -> Result<()> {
        let slots = slots_mut(alloc.translate_mut(self.node)?)?;
        ensure!(
            ndx < slots.len(),
            "int leaf index {} out of bounds (count={})",
            ndx,
            slots.len()
        );
        slots[ndx] = U64::new(value);
        Ok(())
    }

    pub fn insert<A: Allocator>(&self, alloc: &mut A, ndx: usize, value: u64) -> Result<()> {
        let count = self.len(alloc)?;
        ensure!(
            ndx <= count,
            "int leaf insert index {} out of bounds (count={})",
            ndx,
            count
        );

        alloc.resize(self.node, NODE_HEADER_SIZE + (count + 1) * INT_SLOT_SIZE)?;
        let (header, payload) = node_parts_mut(alloc.translate_mut(self.node)?)?;
        payload.copy_within(
            ndx * INT_SLOT_SIZE..count * INT_SLOT_SIZE,
            (ndx + 1) * INT_SLOT_SIZE,
        );
        payload[ndx * INT_SLOT_SIZE..(ndx + 1) * INT_SLOT_SIZE].copy_from_slice(&value.to_le_bytes());
        header.set_count(count as u32 + 1);
        Ok(())
    }

    pub fn add<A: Allocator>(&self, alloc: &mut A, value: u64) -> Result<()> {
        let count = self.len(alloc)?;
        self.insert(alloc, count, value)
    }

    pub fn delete<A: Allocator>(&self, alloc: &mut A, ndx: usize) -> Result<()> {
        let count = self.len(alloc)?;
        ensure!(
            ndx < count,
            "int leaf delete index {} out of bounds (count={})",
            ndx,
            count
        );

        {
            let (header, payload) = node_parts_mut(alloc.translate_mut(self.node)?)?;
            payload.copy_within(
                (ndx + 1) * INT_SLOT_SIZE..count * INT_SLOT_SIZE,
                ndx * INT_SLOT_SIZE,
            );
            header.set_count(count as u32 - 1);
        }
        alloc.resize(self.node, NODE_HEADER_SIZE + (count - 1) * INT_SLOT_SIZE)
    }

    pub fn truncate<A: Allocator>(&self, alloc: &mut A, len: usize) -> Result<()> {
        let count = self.len(alloc)?;
        ensure!(
            len <= count,
            "int leaf truncate to {} exceeds count {}",
            len,
            count
        );

        node_parts_mut(alloc.translate_mut(self.node)?)?
            .0
            .set_count(len as u32);
        alloc.resize(self.node, NODE_HEADER_SIZE + len * INT_SLOT_SIZE)
    }

    pub fn clear<A: Allocator>(&self, alloc: &mut A) -> Result<()> {
        self.truncate(alloc, 0)
    }

    fn scan<A, F>(&self, alloc: &A, start: usize, end: usize, mut visit: F) -> Result<()>
    where
        A: Allocator,
        F: FnMut(usize, u64) -> ControlFlow<()>,
    {
        let slots = slots(alloc.translate(self.node)?)?;
        ensure!(
            start <= end && end <= slots.len(),
            "int leaf scan range {}..{} invalid (count={})",
            start,
            end,
            slots.len()
        );
        for (ndx, slot) in slots[start..end].iter().enumerate() {
            if visit(start + ndx, slot.get()).is_break() {
                break;
            }
        }
        Ok(())
    }

    pub fn find_first<A: Allocator>(
        &self,
        alloc: &A,
        value: u64,
        start: usize,
        end: usize,
    ) -> Result<Option<usize>> {
        let mut found = None;
        self.scan(alloc, start, end, |ndx, stored| {
            if stored == value {
                found = Some(ndx);
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })?;
        Ok(found)
    }

    pub fn find_all<A: Allocator>(
        &self,
        alloc: &A,
        value: u64,
        add_offset: usize,
        start: usize,
        end: usize,
        out: &mut Vec<usize>,
    ) -> Result<()> {
        self.scan(alloc, start, end, |ndx, stored| {
            if stored == value {
                out.push(ndx + add_offset);
            }
            ControlFlow::Continue(())
        })
    }

    pub fn count<A: Allocator>(&self, alloc: &A, value: u64) -> Result<usize> {
        let mut matches = 0;
        let end = self.len(alloc)?;
        self.scan(alloc, 0, end, |_, stored| {
            if stored == value {
                matches += 1;
            }
            ControlFlow::Continue(())
        })?;
        Ok(matches)
    }

    pub fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        alloc.free(self.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SlabAllocator;

    #[test]
    fn insert_get_set_delete() {
        let mut alloc = SlabAllocator::new();
        let leaf = IntLeaf::create(&mut alloc).unwrap();

        leaf.add(&mut alloc, 10).unwrap();
        leaf.add(&mut alloc, 30).unwrap();
        leaf.insert(&mut alloc, 1, 20).unwrap();
        assert_eq!(leaf.len(&alloc).unwrap(), 3);
        assert_eq!(leaf.get(&alloc, 1).unwrap(), 20);

        leaf.set(&mut alloc, 2, u64::MAX).unwrap();
        assert_eq!(leaf.get(&alloc, 2).unwrap(), u64::MAX);

        leaf.delete(&mut alloc, 0).unwrap();
        assert_eq!(leaf.len(&alloc).unwrap(), 2);
        assert_eq!(leaf.get(&alloc, 0).unwrap(), 20);
        assert!(leaf.get(&alloc, 2).is_err());
    }

    #[test]
    fn slots_are_little_endian() {
        let mut alloc = SlabAllocator::new();
        let leaf = IntLeaf::create(&mut alloc).unwrap();
        leaf.add(&mut alloc, 0x0102).unwrap();

        let data = alloc.translate(leaf.node_ref()).unwrap();
        assert_eq!(&data[NODE_HEADER_SIZE..NODE_HEADER_SIZE + 2], &[0x02, 0x01]);
    }

    #[test]
    fn find_and_count() {
        let mut alloc = SlabAllocator::new();
        let leaf = IntLeaf::create(&mut alloc).unwrap();
        for value in [4, 7, 4, 4] {
            leaf.add(&mut alloc, value).unwrap();
        }

        assert_eq!(leaf.find_first(&alloc, 4, 1, 4).unwrap(), Some(2));
        assert_eq!(leaf.find_first(&alloc, 9, 0, 4).unwrap(), None);
        assert_eq!(leaf.count(&alloc, 4).unwrap(), 3);

        let mut out = Vec::new();
        leaf.find_all(&alloc, 4, 100, 1, 4, &mut out).unwrap();
        assert_eq!(out, vec![102, 103]);
    }

    #[test]
    fn truncate_and_clear() {
        let mut alloc = SlabAllocator::new();
        let leaf = IntLeaf::create(&mut alloc).unwrap();
        for value in 0..5 {
            leaf.add(&mut alloc, value).unwrap();
        }

        leaf.truncate(&mut alloc, 2).unwrap();
        assert_eq!(leaf.len(&alloc).unwrap(), 2);
        assert!(leaf.truncate(&mut alloc, 3).is_err());

        leaf.clear(&mut alloc).unwrap();
        assert!(leaf.is_empty(&alloc).unwrap());
    }
}
