//! # Long Leaf
//!
//! Variable-length representation with no limit on value length. A long leaf
//! is what a short leaf becomes once any value reaches 16 bytes.
//!
//! ## Layout
//!
//! ```text
//! +------------------+------------------------+---------------------------+
//! | NodeHeader (8B)  | end offsets (u32 × N)  | blob (concatenated bytes) |
//! +------------------+------------------------+---------------------------+
//!
//! values ["ab", "", "cde"]  →  offsets [2, 2, 5]  blob "abcde"
//! ```
//!
//! Value `i` spans `blob[offsets[i-1]..offsets[i]]` (with `offsets[-1] = 0`).
//!
//! ## Mutation
//!
//! Mutations stage the current values in a per-operation `bumpalo` arena,
//! apply the edit to the staged list, and write the node back in one pass.
//! The arena is dropped when the operation returns.

use std::ops::ControlFlow;

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::FromBytes;

use super::header::{create_node, expect_node_type, node_parts, node_parts_mut, NodeType};
use crate::config::{LONG_OFFSET_SIZE, NODE_HEADER_SIZE};
use crate::storage::{Allocator, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongLeaf {
    node: NodeRef,
}

enum Edit<'v> {
    Set(usize, &'v [u8]),
    Insert(usize, &'v [u8]),
    Delete(usize),
    Truncate(usize),
}

struct LongView<'a> {
    offsets: &'a [U32],
    blob: &'a [u8],
}

impl<'a> LongView<'a> {
    fn parse(data: &'a [u8]) -> Result<Self> {
        let (header, payload) = node_parts(data)?;
        let count = header.count() as usize;
        let offsets_len = count * LONG_OFFSET_SIZE;
        ensure!(
            payload.len() >= offsets_len,
            "long leaf truncated: {} bytes for {} offsets",
            payload.len(),
            count
        );
        let (offsets, blob) = payload.split_at(offsets_len);
        let offsets = <[U32]>::ref_from_bytes(offsets)
            .map_err(|e| eyre::eyre!("failed to read long leaf offsets: {:?}", e))?;
        Ok(Self { offsets, blob })
    }

    fn len(&self) -> usize {
        self.offsets.len()
    }

    fn span(&self, ndx: usize) -> Result<(usize, usize)> {
        ensure!(
            ndx < self.len(),
            "long leaf index {} out of bounds (count={})",
            ndx,
            self.len()
        );
        let start = if ndx == 0 {
            0
        } else {
            self.offsets[ndx - 1].get() as usize
        };
        let end = self.offsets[ndx].get() as usize;
        ensure!(
            start <= end && end <= self.blob.len(),
            "corrupt long leaf offsets at {}: {}..{} (blob {})",
            ndx,
            start,
            end,
            self.blob.len()
        );
        Ok((start, end))
    }

    fn value(&self, ndx: usize) -> Result<&'a [u8]> {
        let (start, end) = self.span(ndx)?;
        Ok(&self.blob[start..end])
    }
}

/// Rewrites `node` to hold exactly `values`, in order.
fn write_values<A: Allocator>(alloc: &mut A, node: NodeRef, values: &[&[u8]]) -> Result<()> {
    let blob_len: usize = values.iter().map(|v| v.len()).sum();
    ensure!(
        blob_len <= u32::MAX as usize,
        "long leaf blob of {} bytes exceeds u32 offsets",
        blob_len
    );

    let offsets_len = values.len() * LONG_OFFSET_SIZE;
    alloc.resize(node, NODE_HEADER_SIZE + offsets_len + blob_len)?;

    let (header, payload) = node_parts_mut(alloc.translate_mut(node)?)?;
    header.set_count(values.len() as u32);

    let (offsets, blob) = payload.split_at_mut(offsets_len);
    let offsets = <[U32]>::mut_from_bytes(offsets)
        .map_err(|e| eyre::eyre!("failed to write long leaf offsets: {:?}", e))?;

    let mut end = 0;
    for (ndx, value) in values.iter().enumerate() {
        blob[end..end + value.len()].copy_from_slice(value);
        end += value.len();
        offsets[ndx] = U32::new(end as u32);
    }
    Ok(())
}

impl LongLeaf {
    pub fn create<A: Allocator>(alloc: &mut A) -> Result<Self> {
        let node = create_node(alloc, NodeType::LongLeaf, 0)?;
        Ok(Self { node })
    }

    /// Creates a long leaf holding `values` in order.
    pub fn create_from<A: Allocator>(alloc: &mut A, values: &[&[u8]]) -> Result<Self> {
        let leaf = Self::create(alloc)?;
        write_values(alloc, leaf.node, values)?;
        Ok(leaf)
    }

    pub fn open<A: Allocator>(alloc: &A, node: NodeRef) -> Result<Self> {
        expect_node_type(alloc, node, NodeType::LongLeaf)?;
        Ok(Self { node })
    }

    pub fn node_ref(&self) -> NodeRef {
        self.node
    }

    pub fn len<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        Ok(LongView::parse(alloc.translate(self.node)?)?.len())
    }

    pub fn is_empty<A: Allocator>(&self, alloc: &A) -> Result<bool> {
        Ok(self.len(alloc)? == 0)
    }

    pub fn get<'a, A: Allocator>(&self, alloc: &'a A, ndx: usize) -> Result<&'a [u8]> {
        LongView::parse(alloc.translate(self.node)?)?.value(ndx)
    }

    /// Copies every value into `bump`, preserving order.
    pub fn values_in<'b, A: Allocator>(
        &self,
        alloc: &A,
        bump: &'b Bump,
    ) -> Result<BumpVec<'b, &'b [u8]>> {
        let view = LongView::parse(alloc.translate(self.node)?)?;
        let blob: &'b [u8] = bump.alloc_slice_copy(view.blob);
        let mut values = BumpVec::with_capacity_in(view.len(), bump);
        for ndx in 0..view.len() {
            let (start, end) = view.span(ndx)?;
            values.push(&blob[start..end]);
        }
        Ok(values)
    }

    fn edit<A: Allocator>(&self, alloc: &mut A, edit: Edit<'_>) -> Result<()> {
        let bump = Bump::new();
        let mut values = self.values_in(alloc, &bump)?;

        let count = values.len();
        match edit {
            Edit::Set(ndx, value) => {
                ensure!(
                    ndx < count,
                    "long leaf index {} out of bounds (count={})",
                    ndx,
                    count
                );
                values[ndx] = value;
            }
            Edit::Insert(ndx, value) => {
                ensure!(
                    ndx <= count,
                    "long leaf insert index {} out of bounds (count={})",
                    ndx,
                    count
                );
                values.insert(ndx, value);
            }
            Edit::Delete(ndx) => {
                ensure!(
                    ndx < count,
                    "long leaf delete index {} out of bounds (count={})",
                    ndx,
                    count
                );
                values.remove(ndx);
            }
            Edit::Truncate(len) => {
                ensure!(
                    len <= count,
                    "long leaf truncate to {} exceeds count {}",
                    len,
                    count
                );
                values.truncate(len);
            }
        }

        write_values(alloc, self.node, &values)
    }

    pub fn set<A: Allocator>(&self, alloc: &mut A, ndx: usize, value: &[u8]) -> Result<()> {
        self.edit(alloc, Edit::Set(ndx, value))
    }

    pub fn insert<A: Allocator>(&self, alloc: &mut A, ndx: usize, value: &[u8]) -> Result<()> {
        self.edit(alloc, Edit::Insert(ndx, value))
    }

    /// Appends `values` in one rewrite of the node.
    pub fn extend<A: Allocator>(&self, alloc: &mut A, values: &[&[u8]]) -> Result<()> {
        let bump = Bump::new();
        let mut staged = self.values_in(alloc, &bump)?;
        staged.extend_from_slice(values);
        write_values(alloc, self.node, &staged)
    }

    pub fn add<A: Allocator>(&self, alloc: &mut A, value: &[u8]) -> Result<()> {
        let count = self.len(alloc)?;
        self.insert(alloc, count, value)
    }

    pub fn delete<A: Allocator>(&self, alloc: &mut A, ndx: usize) -> Result<()> {
        self.edit(alloc, Edit::Delete(ndx))
    }

    pub fn truncate<A: Allocator>(&self, alloc: &mut A, len: usize) -> Result<()> {
        self.edit(alloc, Edit::Truncate(len))
    }

    pub fn clear<A: Allocator>(&self, alloc: &mut A) -> Result<()> {
        write_values(alloc, self.node, &[])
    }

    fn scan<A, F>(&self, alloc: &A, start: usize, end: usize, mut visit: F) -> Result<()>
    where
        A: Allocator,
        F: FnMut(usize, &[u8]) -> ControlFlow<()>,
    {
        let view = LongView::parse(alloc.translate(self.node)?)?;
        ensure!(
            start <= end && end <= view.len(),
            "long leaf scan range {}..{} invalid (count={})",
            start,
            end,
            view.len()
        );
        for ndx in start..end {
            if visit(ndx, view.value(ndx)?).is_break() {
                break;
            }
        }
        Ok(())
    }

    pub fn find_first<A: Allocator>(
        &self,
        alloc: &A,
        value: &[u8],
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
        value: &[u8],
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

    pub fn count<A: Allocator>(&self, alloc: &A, value: &[u8]) -> Result<usize> {
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

    fn leaf_with(alloc: &mut SlabAllocator, values: &[&str]) -> LongLeaf {
        let leaf = LongLeaf::create(alloc).unwrap();
        for value in values {
            leaf.add(alloc, value.as_bytes()).unwrap();
        }
        leaf
    }

    #[test]
    fn offsets_are_cumulative_end_positions() {
        let mut alloc = SlabAllocator::new();
        let leaf = LongLeaf::create_from(&mut alloc, &[&b"ab"[..], &b""[..], &b"cde"[..]]).unwrap();

        let data = alloc.translate(leaf.node_ref()).unwrap();
        let payload = &data[NODE_HEADER_SIZE..];
        assert_eq!(&payload[0..4], &2u32.to_le_bytes());
        assert_eq!(&payload[4..8], &2u32.to_le_bytes());
        assert_eq!(&payload[8..12], &5u32.to_le_bytes());
        assert_eq!(&payload[12..], b"abcde");
    }

    #[test]
    fn stores_values_of_any_length() {
        let mut alloc = SlabAllocator::new();
        let long_value = "x".repeat(5000);
        let leaf = leaf_with(&mut alloc, &["", "short", &long_value]);

        assert_eq!(leaf.len(&alloc).unwrap(), 3);
        assert_eq!(leaf.get(&alloc, 0).unwrap(), b"");
        assert_eq!(leaf.get(&alloc, 1).unwrap(), b"short");
        assert_eq!(leaf.get(&alloc, 2).unwrap(), long_value.as_bytes());
    }

    #[test]
    fn insert_set_delete_truncate() {
        let mut alloc = SlabAllocator::new();
        let leaf = leaf_with(&mut alloc, &["alpha", "gamma"]);

        leaf.insert(&mut alloc, 1, b"a value longer than sixteen").unwrap();
        leaf.set(&mut alloc, 0, b"").unwrap();

        assert_eq!(leaf.get(&alloc, 0).unwrap(), b"");
        assert_eq!(leaf.get(&alloc, 1).unwrap(), b"a value longer than sixteen");
        assert_eq!(leaf.get(&alloc, 2).unwrap(), b"gamma");

        leaf.delete(&mut alloc, 1).unwrap();
        assert_eq!(leaf.len(&alloc).unwrap(), 2);
        assert_eq!(leaf.get(&alloc, 1).unwrap(), b"gamma");

        leaf.truncate(&mut alloc, 0).unwrap();
        assert!(leaf.is_empty(&alloc).unwrap());
    }

    #[test]
    fn out_of_bounds_edits_leave_leaf_untouched() {
        let mut alloc = SlabAllocator::new();
        let leaf = leaf_with(&mut alloc, &["one"]);

        assert!(leaf.set(&mut alloc, 1, b"x").is_err());
        assert!(leaf.insert(&mut alloc, 2, b"x").is_err());
        assert!(leaf.delete(&mut alloc, 1).is_err());

        assert_eq!(leaf.len(&alloc).unwrap(), 1);
        assert_eq!(leaf.get(&alloc, 0).unwrap(), b"one");
    }

    #[test]
    fn find_and_count() {
        let mut alloc = SlabAllocator::new();
        let leaf = leaf_with(&mut alloc, &["a string of twenty b", "x", "a string of twenty b"]);

        assert_eq!(
            leaf.find_first(&alloc, b"a string of twenty b", 1, 3).unwrap(),
            Some(2)
        );
        assert_eq!(leaf.find_first(&alloc, b"y", 0, 3).unwrap(), None);
        assert_eq!(leaf.count(&alloc, b"a string of twenty b").unwrap(), 2);

        let mut out = Vec::new();
        leaf.find_all(&alloc, b"a string of twenty b", 5, 0, 3, &mut out).unwrap();
        assert_eq!(out, vec![5, 7]);
    }

    #[test]
    fn extend_appends_in_order() {
        let mut alloc = SlabAllocator::new();
        let leaf = leaf_with(&mut alloc, &["first"]);

        leaf.extend(&mut alloc, &[&b"second"[..], &b"a third value past sixteen"[..]])
            .unwrap();

        assert_eq!(leaf.len(&alloc).unwrap(), 3);
        assert_eq!(leaf.get(&alloc, 0).unwrap(), b"first");
        assert_eq!(leaf.get(&alloc, 2).unwrap(), b"a third value past sixteen");
    }

    #[test]
    fn clear_empties_leaf() {
        let mut alloc = SlabAllocator::new();
        let leaf = leaf_with(&mut alloc, &["a", "b"]);

        leaf.clear(&mut alloc).unwrap();

        assert!(leaf.is_empty(&alloc).unwrap());
        assert_eq!(alloc.translate(leaf.node_ref()).unwrap().len(), NODE_HEADER_SIZE);
    }
}
