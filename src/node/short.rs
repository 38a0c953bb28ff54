//! # Short Leaf
//!
//! Fixed-width packed representation for strings shorter than
//! [`SHORT_STRING_LIMIT`] bytes. Every slot in a leaf has the same width,
//! chosen from [`SHORT_SLOT_WIDTHS`] as the smallest that fits the longest
//! value stored so far.
//!
//! ## Slot Layout
//!
//! ```text
//! width = 8, value = "pear"
//! +----+----+----+----+----+----+----+----+
//! | p  | e  | a  | r  | 00 | 00 | 00 | 03 |
//! +----+----+----+----+----+----+----+----+
//!   value bytes         zero pad       └─ width - 1 - len
//! ```
//!
//! The trailing byte makes the length recoverable without a separate length
//! array, and is why a 16-byte slot holds at most 15 bytes. Width 0 is used
//! while every stored value is empty; such a leaf has no payload at all.
//!
//! ## Widening
//!
//! Storing a value that does not fit the current width rewrites every slot at
//! the new width, in place, walking from the last slot to the first so that
//! no slot is overwritten before it has been moved.

use std::ops::ControlFlow;

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use eyre::{ensure, Result};

use super::header::{create_node, expect_node_type, node_parts, node_parts_mut, NodeType};
use crate::config::{NODE_HEADER_SIZE, SHORT_SLOT_WIDTHS, SHORT_STRING_LIMIT};
use crate::storage::{Allocator, NodeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortLeaf {
    node: NodeRef,
}

/// Smallest slot width able to hold a value of `len` bytes.
pub fn slot_width_for(len: usize) -> Option<usize> {
    if len == 0 {
        return Some(0);
    }
    SHORT_SLOT_WIDTHS.iter().copied().find(|&width| len < width)
}

fn decode_slot(slot: &[u8]) -> Result<&[u8]> {
    let width = slot.len();
    let pad = slot[width - 1] as usize;
    ensure!(
        pad < width,
        "corrupt short slot: padding {} >= width {}",
        pad,
        width
    );
    Ok(&slot[..width - 1 - pad])
}

fn encode_slot(slot: &mut [u8], value: &[u8]) {
    let width = slot.len();
    let len = value.len();
    slot[..len].copy_from_slice(value);
    slot[len..width - 1].fill(0);
    slot[width - 1] = (width - 1 - len) as u8;
}

fn slot_value(payload: &[u8], width: usize, ndx: usize) -> Result<&[u8]> {
    if width == 0 {
        return Ok(&[]);
    }
    decode_slot(&payload[ndx * width..(ndx + 1) * width])
}

impl ShortLeaf {
    pub fn create<A: Allocator>(alloc: &mut A) -> Result<Self> {
        let node = create_node(alloc, NodeType::ShortLeaf, 0)?;
        Ok(Self { node })
    }

    pub fn open<A: Allocator>(alloc: &A, node: NodeRef) -> Result<Self> {
        expect_node_type(alloc, node, NodeType::ShortLeaf)?;
        Ok(Self { node })
    }

    pub fn node_ref(&self) -> NodeRef {
        self.node
    }

    /// Returns `(width, count)` after checking the payload covers every slot.
    fn layout<A: Allocator>(&self, alloc: &A) -> Result<(usize, usize)> {
        let (header, payload) = node_parts(alloc.translate(self.node)?)?;
        let width = header.width();
        let count = header.count() as usize;
        ensure!(
            payload.len() >= width * count,
            "short leaf {} truncated: {} bytes for {} slots of width {}",
            self.node,
            payload.len(),
            count,
            width
        );
        Ok((width, count))
    }

    pub fn len<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        Ok(self.layout(alloc)?.1)
    }

    pub fn is_empty<A: Allocator>(&self, alloc: &A) -> Result<bool> {
        Ok(self.len(alloc)? == 0)
    }

    pub fn width<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        Ok(self.layout(alloc)?.0)
    }

    pub fn get<'a, A: Allocator>(&self, alloc: &'a A, ndx: usize) -> Result<&'a [u8]> {
        let (width, count) = self.layout(alloc)?;
        ensure!(
            ndx < count,
            "short leaf index {} out of bounds (count={})",
            ndx,
            count
        );
        let (_, payload) = node_parts(alloc.translate(self.node)?)?;
        slot_value(payload, width, ndx)
    }

    /// Copies every value into `bump`, preserving order.
    pub fn values_in<'b, A: Allocator>(
        &self,
        alloc: &A,
        bump: &'b Bump,
    ) -> Result<BumpVec<'b, &'b [u8]>> {
        let (width, count) = self.layout(alloc)?;
        let (_, payload) = node_parts(alloc.translate(self.node)?)?;
        let mut values = BumpVec::with_capacity_in(count + 1, bump);
        for ndx in 0..count {
            let value: &'b [u8] = bump.alloc_slice_copy(slot_value(payload, width, ndx)?);
            values.push(value);
        }
        Ok(values)
    }

    fn ensure_fits(value: &[u8]) -> Result<()> {
        ensure!(
            value.len() < SHORT_STRING_LIMIT,
            "value of {} bytes does not fit a short leaf (limit {})",
            value.len(),
            SHORT_STRING_LIMIT
        );
        Ok(())
    }

    /// Widens every slot so a value of `len` bytes fits; returns the width.
    fn ensure_width<A: Allocator>(&self, alloc: &mut A, len: usize) -> Result<usize> {
        let (old_width, count) = self.layout(alloc)?;
        let needed = slot_width_for(len).unwrap_or(SHORT_STRING_LIMIT);
        if needed <= old_width {
            return Ok(old_width);
        }

        alloc.resize(self.node, NODE_HEADER_SIZE + count * needed)?;
        let (header, payload) = node_parts_mut(alloc.translate_mut(self.node)?)?;
        for ndx in (0..count).rev() {
            let len = slot_value(payload, old_width, ndx)?.len();
            let src = ndx * old_width;
            let dst = ndx * needed;
            payload.copy_within(src..src + len, dst);
            payload[dst + len..dst + needed - 1].fill(0);
            payload[dst + needed - 1] = (needed - 1 - len) as u8;
        }
        header.set_width(needed);
        Ok(needed)
    }

    pub fn set<A: Allocator>(&self, alloc: &mut A, ndx: usize, value: &[u8]) -> Result<()> {
        Self::ensure_fits(value)?;
        let count = self.len(alloc)?;
        ensure!(
            ndx < count,
            "short leaf index {} out of bounds (count={})",
            ndx,
            count
        );

        let width = self.ensure_width(alloc, value.len())?;
        if width == 0 {
            return Ok(());
        }
        let (_, payload) = node_parts_mut(alloc.translate_mut(self.node)?)?;
        encode_slot(&mut payload[ndx * width..(ndx + 1) * width], value);
        Ok(())
    }

    pub fn insert<A: Allocator>(&self, alloc: &mut A, ndx: usize, value: &[u8]) -> Result<()> {
        Self::ensure_fits(value)?;
        let count = self.len(alloc)?;
        ensure!(
            ndx <= count,
            "short leaf insert index {} out of bounds (count={})",
            ndx,
            count
        );

        let width = self.ensure_width(alloc, value.len())?;
        alloc.resize(self.node, NODE_HEADER_SIZE + (count + 1) * width)?;
        let (header, payload) = node_parts_mut(alloc.translate_mut(self.node)?)?;
        payload.copy_within(ndx * width..count * width, (ndx + 1) * width);
        if width > 0 {
            encode_slot(&mut payload[ndx * width..(ndx + 1) * width], value);
        }
        header.set_count(count as u32 + 1);
        Ok(())
    }

    pub fn add<A: Allocator>(&self, alloc: &mut A, value: &[u8]) -> Result<()> {
        let count = self.len(alloc)?;
        self.insert(alloc, count, value)
    }

    pub fn delete<A: Allocator>(&self, alloc: &mut A, ndx: usize) -> Result<()> {
        let (width, count) = self.layout(alloc)?;
        ensure!(
            ndx < count,
            "short leaf delete index {} out of bounds (count={})",
            ndx,
            count
        );

        {
            let (header, payload) = node_parts_mut(alloc.translate_mut(self.node)?)?;
            payload.copy_within((ndx + 1) * width..count * width, ndx * width);
            header.set_count(count as u32 - 1);
        }
        alloc.resize(self.node, NODE_HEADER_SIZE + (count - 1) * width)
    }

    /// Drops every value at or after `len`. Slot width is kept.
    pub fn truncate<A: Allocator>(&self, alloc: &mut A, len: usize) -> Result<()> {
        let (width, count) = self.layout(alloc)?;
        ensure!(
            len <= count,
            "short leaf truncate to {} exceeds count {}",
            len,
            count
        );

        node_parts_mut(alloc.translate_mut(self.node)?)?
            .0
            .set_count(len as u32);
        alloc.resize(self.node, NODE_HEADER_SIZE + len * width)
    }

    pub fn clear<A: Allocator>(&self, alloc: &mut A) -> Result<()> {
        {
            let (header, _) = node_parts_mut(alloc.translate_mut(self.node)?)?;
            header.set_count(0);
            header.set_width(0);
        }
        alloc.resize(self.node, NODE_HEADER_SIZE)
    }

    fn scan<A, F>(&self, alloc: &A, start: usize, end: usize, mut visit: F) -> Result<()>
    where
        A: Allocator,
        F: FnMut(usize, &[u8]) -> ControlFlow<()>,
    {
        let (width, count) = self.layout(alloc)?;
        ensure!(
            start <= end && end <= count,
            "short leaf scan range {}..{} invalid (count={})",
            start,
            end,
            count
        );
        let (_, payload) = node_parts(alloc.translate(self.node)?)?;
        for ndx in start..end {
            if visit(ndx, slot_value(payload, width, ndx)?).is_break() {
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
        if value.len() >= SHORT_STRING_LIMIT {
            return Ok(None);
        }
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
        if value.len() >= SHORT_STRING_LIMIT {
            return Ok(());
        }
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
