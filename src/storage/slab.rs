//! # Slab Allocator
//!
//! In-memory [`Allocator`]: a table of owned buffers indexed by
//! `NodeRef - 1`. Reference 0 stays reserved for [`NodeRef::NULL`]. Released
//! slots go to a [`Freelist`] and are handed out again before the table grows.
//!
//! ```text
//! slots:  [ Some(buf) | None | Some(buf) | ... ]
//!            ref #1     #2      ref #3
//!                       ^ freelist
//! ```

use eyre::{ensure, eyre, Result};

use super::allocator::{Allocator, NodeRef};
use super::freelist::Freelist;

#[derive(Debug, Default)]
pub struct SlabAllocator {
    slots: Vec<Option<Vec<u8>>>,
    freelist: Freelist,
    allocated_bytes: usize,
}

impl SlabAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers currently allocated.
    pub fn live_nodes(&self) -> usize {
        self.slots.len() - self.freelist.free_count()
    }

    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes
    }

    fn slot_index(node: NodeRef) -> Result<usize> {
        ensure!(!node.is_null(), "cannot translate null node reference");
        Ok((node.get() - 1) as usize)
    }

    fn buffer(&self, node: NodeRef) -> Result<&Vec<u8>> {
        let index = Self::slot_index(node)?;
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| eyre!("node {} is not allocated", node))
    }

    fn buffer_mut(&mut self, node: NodeRef) -> Result<&mut Vec<u8>> {
        let index = Self::slot_index(node)?;
        self.slots
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or_else(|| eyre!("node {} is not allocated", node))
    }
}

impl Allocator for SlabAllocator {
    fn alloc(&mut self, size: usize) -> Result<NodeRef> {
        let buffer = vec![0u8; size];
        self.allocated_bytes += size;

        let index = match self.freelist.acquire() {
            Some(index) => {
                self.slots[index] = Some(buffer);
                index
            }
            None => {
                self.slots.push(Some(buffer));
                self.slots.len() - 1
            }
        };

        Ok(NodeRef::new(index as u64 + 1))
    }

    fn translate(&self, node: NodeRef) -> Result<&[u8]> {
        self.buffer(node).map(Vec::as_slice)
    }

    fn translate_mut(&mut self, node: NodeRef) -> Result<&mut [u8]> {
        self.buffer_mut(node).map(Vec::as_mut_slice)
    }

    fn resize(&mut self, node: NodeRef, size: usize) -> Result<()> {
        let buffer = self.buffer_mut(node)?;
        let old_size = buffer.len();
        buffer.resize(size, 0);
        self.allocated_bytes = self.allocated_bytes - old_size + size;
        Ok(())
    }

    fn free(&mut self, node: NodeRef) -> Result<()> {
        let index = Self::slot_index(node)?;
        let buffer = self
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| eyre!("double free of node {}", node))?;
        self.allocated_bytes -= buffer.len();
        self.freelist.release(index);
        Ok(())
    }
}
