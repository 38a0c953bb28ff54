//! # Inner Node
//!
//! Index node above the leaves of a column tree. Each slot pairs a child
//! reference with the cumulative row count of every child up to and
//! including it, so the total size of the subtree is the last offset.
//!
//! ```text
//! +------------------+---------------------+---------------------+-----+
//! | NodeHeader (8B)  | child[0] | off[0]   | child[1] | off[1]   | ... |
//! |  count = slots   |  u64     |  u64     |  u64     |  u64     |     |
//! +------------------+---------------------+---------------------+-----+
//!
//! children sizes 3, 5, 2  ->  offsets 3, 8, 10
//! row 4 lives in child 1 at leaf row 4 - 3 = 1
//! ```
//!
//! Locating the child that owns a row is a binary search over the offsets:
//! the owner is the first slot whose offset is greater than the row.

use eyre::{ensure, Result};
use zerocopy::little_endian::U64;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::header::{create_node, expect_node_type, node_parts, node_parts_mut, NodeType};
use crate::config::{INNER_SLOT_SIZE, NODE_HEADER_SIZE};
use crate::storage::{Allocator, NodeRef};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InnerSlot {
    child: U64,
    offset: U64,
}

const _: () = assert!(
    std::mem::size_of::<InnerSlot>() == INNER_SLOT_SIZE,
    "InnerSlot layout must match INNER_SLOT_SIZE"
);

impl InnerSlot {
    pub fn new(child: NodeRef, offset: u64) -> Self {
        Self {
            child: U64::new(child.get()),
            offset: U64::new(offset),
        }
    }

    pub fn child_ref(&self) -> NodeRef {
        NodeRef::new(self.child.get())
    }

    pub fn set_child_ref(&mut self, child: NodeRef) {
        self.child = U64::new(child.get());
    }

    zerocopy_accessors! {
        offset: u64,
    }
}

fn slots(data: &[u8]) -> Result<&[InnerSlot]> {
    let (header, payload) = node_parts(data)?;
    let len = header.count() as usize * INNER_SLOT_SIZE;
    ensure!(
        payload.len() >= len,
        "inner node truncated: {} bytes for {} slots",
        payload.len(),
        header.count()
    );
    <[InnerSlot]>::ref_from_bytes(&payload[..len])
        .map_err(|e| eyre::eyre!("failed to read inner node slots: {:?}", e))
}

fn slots_mut(data: &mut [u8]) -> Result<&mut [InnerSlot]> {
    let (header, payload) = node_parts_mut(data)?;
    let len = header.count() as usize * INNER_SLOT_SIZE;
    ensure!(
        payload.len() >= len,
        "inner node truncated: {} bytes for {} slots",
        payload.len(),
        header.count()
    );
    <[InnerSlot]>::mut_from_bytes(&mut payload[..len])
        .map_err(|e| eyre::eyre!("failed to read inner node slots: {:?}", e))
}

/// The slot of an [`InnerNode`] that references a given child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub node: NodeRef,
    pub ndx: usize,
}

impl ParentLink {
    pub fn new(node: NodeRef, ndx: usize) -> Self {
        Self { node, ndx }
    }

    /// Repoints the parent slot at `child`. The cumulative offset is kept.
    pub fn update_child_ref<A: Allocator>(&self, alloc: &mut A, child: NodeRef) -> Result<()> {
        InnerNode::open(alloc, self.node)?.set_child(alloc, self.ndx, child)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerNode {
    node: NodeRef,
}

impl InnerNode {
    /// Builds an inner node over `children`, given as `(child, row_count)`.
    pub fn create<A: Allocator>(alloc: &mut A, children: &[(NodeRef, usize)]) -> Result<Self> {
        let node = create_node(alloc, NodeType::InnerNode, children.len() * INNER_SLOT_SIZE)?;
        let data = alloc.translate_mut(node)?;
        node_parts_mut(data)?.0.set_count(children.len() as u32);

        let slots = slots_mut(data)?;
        let mut total = 0u64;
        for (slot, &(child, rows)) in slots.iter_mut().zip(children) {
            total += rows as u64;
            *slot = InnerSlot::new(child, total);
        }
        Ok(Self { node })
    }

    pub fn open<A: Allocator>(alloc: &A, node: NodeRef) -> Result<Self> {
        expect_node_type(alloc, node, NodeType::InnerNode)?;
        Ok(Self { node })
    }

    pub fn node_ref(&self) -> NodeRef {
        self.node
    }

    pub fn child_count<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        Ok(slots(alloc.translate(self.node)?)?.len())
    }

    fn slot<A: Allocator>(&self, alloc: &A, ndx: usize) -> Result<InnerSlot> {
        let slots = slots(alloc.translate(self.node)?)?;
        ensure!(
            ndx < slots.len(),
            "inner node {} child index {} out of bounds (count={})",
            self.node,
            ndx,
            slots.len()
        );
        Ok(slots[ndx])
    }

    pub fn child<A: Allocator>(&self, alloc: &A, ndx: usize) -> Result<NodeRef> {
        Ok(self.slot(alloc, ndx)?.child_ref())
    }

    /// Cumulative row count up to and including child `ndx`.
    pub fn offset<A: Allocator>(&self, alloc: &A, ndx: usize) -> Result<usize> {
        Ok(self.slot(alloc, ndx)?.offset() as usize)
    }

    /// First row owned by child `ndx`.
    pub fn base<A: Allocator>(&self, alloc: &A, ndx: usize) -> Result<usize> {
        if ndx == 0 {
            return Ok(0);
        }
        self.offset(alloc, ndx - 1)
    }

    pub fn child_size<A: Allocator>(&self, alloc: &A, ndx: usize) -> Result<usize> {
        Ok(self.offset(alloc, ndx)? - self.base(alloc, ndx)?)
    }

    pub fn size<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        let slots = slots(alloc.translate(self.node)?)?;
        Ok(slots.last().map_or(0, |slot| slot.offset() as usize))
    }

    /// Every `(child, row_count)` pair, in order.
    pub fn children<A: Allocator>(&self, alloc: &A) -> Result<Vec<(NodeRef, usize)>> {
        let slots = slots(alloc.translate(self.node)?)?;
        let mut prev = 0u64;
        Ok(slots
            .iter()
            .map(|slot| {
                let rows = slot.offset() - prev;
                prev = slot.offset();
                (slot.child_ref(), rows as usize)
            })
            .collect())
    }

    pub fn set_child<A: Allocator>(&self, alloc: &mut A, ndx: usize, child: NodeRef) -> Result<()> {
        let slots = slots_mut(alloc.translate_mut(self.node)?)?;
        ensure!(
            ndx < slots.len(),
            "inner node {} child index {} out of bounds (count={})",
            self.node,
            ndx,
            slots.len()
        );
        slots[ndx].set_child_ref(child);
        Ok(())
    }

    /// Adds `delta` rows to the offsets of child `from` and every later child.
    pub fn adjust_offsets<A: Allocator>(&self, alloc: &mut A, from: usize, delta: isize) -> Result<()> {
        let slots = slots_mut(alloc.translate_mut(self.node)?)?;
        ensure!(
            from <= slots.len(),
            "inner node {} adjust start {} out of bounds (count={})",
            self.node,
            from,
            slots.len()
        );
        for slot in &mut slots[from..] {
            let offset = slot.offset() as i64 + delta as i64;
            ensure!(offset >= 0, "inner node {} offset underflow", self.node);
            slot.set_offset(offset as u64);
        }
        Ok(())
    }

    /// Inserts `child` holding `rows` rows at slot `ndx`, shifting later
    /// offsets by `rows`.
    pub fn insert_child<A: Allocator>(
        &self,
        alloc: &mut A,
        ndx: usize,
        child: NodeRef,
        rows: usize,
    ) -> Result<()> {
        let count = self.child_count(alloc)?;
        ensure!(
            ndx <= count,
            "inner node {} insert index {} out of bounds (count={})",
            self.node,
            ndx,
            count
        );
        let base = self.base(alloc, ndx)?;

        alloc.resize(self.node, NODE_HEADER_SIZE + (count + 1) * INNER_SLOT_SIZE)?;
        let data = alloc.translate_mut(self.node)?;
        node_parts_mut(data)?.0.set_count(count as u32 + 1);

        let slots = slots_mut(data)?;
        slots.copy_within(ndx..count, ndx + 1);
        slots[ndx] = InnerSlot::new(child, (base + rows) as u64);
        for slot in &mut slots[ndx + 1..] {
            slot.set_offset(slot.offset() + rows as u64);
        }
        Ok(())
    }

    /// Removes slot `ndx` and returns the child it referenced. Later offsets
    /// drop by the removed child's row count. The child is not freed.
    pub fn remove_child<A: Allocator>(&self, alloc: &mut A, ndx: usize) -> Result<NodeRef> {
        let count = self.child_count(alloc)?;
        ensure!(
            ndx < count,
            "inner node {} remove index {} out of bounds (count={})",
            self.node,
            ndx,
            count
        );
        let rows = self.child_size(alloc, ndx)? as u64;
        let child = self.child(alloc, ndx)?;

        {
            let data = alloc.translate_mut(self.node)?;
            let slots = slots_mut(data)?;
            slots.copy_within(ndx + 1..count, ndx);
            for slot in &mut slots[ndx..count - 1] {
                slot.set_offset(slot.offset() - rows);
            }
            node_parts_mut(data)?.0.set_count(count as u32 - 1);
        }
        alloc.resize(self.node, NODE_HEADER_SIZE + (count - 1) * INNER_SLOT_SIZE)?;
        Ok(child)
    }

    /// Moves children `at..` into a new inner node and returns it.
    pub fn split_off<A: Allocator>(&self, alloc: &mut A, at: usize) -> Result<InnerNode> {
        let count = self.child_count(alloc)?;
        ensure!(
            at <= count,
            "inner node {} split point {} out of bounds (count={})",
            self.node,
            at,
            count
        );
        let tail = self.children(alloc)?.split_off(at);
        let right = InnerNode::create(alloc, &tail)?;

        node_parts_mut(alloc.translate_mut(self.node)?)?
            .0
            .set_count(at as u32);
        alloc.resize(self.node, NODE_HEADER_SIZE + at * INNER_SLOT_SIZE)?;
        Ok(right)
    }

    /// Finds the child owning `row`, returning `(child index, leaf row)`.
    pub fn child_for_row<A: Allocator>(&self, alloc: &A, row: usize) -> Result<(usize, usize)> {
        let slots = slots(alloc.translate(self.node)?)?;
        let size = slots.last().map_or(0, |slot| slot.offset() as usize);
        ensure!(
            row < size,
            "row {} out of bounds for inner node {} (size={})",
            row,
            self.node,
            size
        );
        let ndx = slots.partition_point(|slot| slot.offset() as usize <= row);
        let base = if ndx == 0 { 0 } else { slots[ndx - 1].offset() as usize };
        Ok((ndx, row - base))
    }

    /// Like [`child_for_row`](Self::child_for_row), but `row == size` maps to
    /// one past the end of the last child.
    pub fn child_for_insert<A: Allocator>(&self, alloc: &A, row: usize) -> Result<(usize, usize)> {
        let slots = slots(alloc.translate(self.node)?)?;
        ensure!(!slots.is_empty(), "inner node {} has no children", self.node);
        let size = slots[slots.len() - 1].offset() as usize;
        ensure!(
            row <= size,
            "insert row {} out of bounds for inner node {} (size={})",
            row,
            self.node,
            size
        );
        if row == size {
            let last = slots.len() - 1;
            let base = if last == 0 { 0 } else { slots[last - 1].offset() as usize };
            return Ok((last, row - base));
        }
        let ndx = slots.partition_point(|slot| slot.offset() as usize <= row);
        let base = if ndx == 0 { 0 } else { slots[ndx - 1].offset() as usize };
        Ok((ndx, row - base))
    }

    /// Frees this node only; children are left to the caller.
    pub fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        alloc.free(self.node)
    }
}
