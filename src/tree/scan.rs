//! Leaf-by-leaf traversal and the searches built on it.
//!
//! Hits are reported by leaves in leaf-relative rows; the traversal hands
//! every leaf its absolute base row so callers can translate them.

use std::ops::ControlFlow;

use eyre::Result;

use super::TreeLeaf;
use crate::node::{node_type_of, InnerNode, NodeType};
use crate::storage::{Allocator, NodeRef};

/// Calls `visit(leaf, base_row)` for every leaf overlapping `start..end`,
/// left to right, until it breaks.
pub fn visit_leaves<L, A, F>(
    alloc: &A,
    root: NodeRef,
    start: usize,
    end: usize,
    mut visit: F,
) -> Result<ControlFlow<()>>
where
    L: TreeLeaf,
    A: Allocator,
    F: FnMut(&L, usize) -> Result<ControlFlow<()>>,
{
    visit_node::<L, A, F>(alloc, root, 0, start, end, &mut visit)
}

fn visit_node<L, A, F>(
    alloc: &A,
    node: NodeRef,
    base: usize,
    start: usize,
    end: usize,
    visit: &mut F,
) -> Result<ControlFlow<()>>
where
    L: TreeLeaf,
    A: Allocator,
    F: FnMut(&L, usize) -> Result<ControlFlow<()>>,
{
    if node_type_of(alloc, node)? != NodeType::InnerNode {
        let leaf = L::open(alloc, node, None)?;
        return visit(&leaf, base);
    }

    let inner = InnerNode::open(alloc, node)?;
    let mut child_base = base;
    for (child, rows) in inner.children(alloc)? {
        let child_end = child_base + rows;
        if child_end > start
            && child_base < end
            && visit_node::<L, A, F>(alloc, child, child_base, start, end, visit)?.is_break()
        {
            return Ok(ControlFlow::Break(()));
        }
        if child_end >= end {
            break;
        }
        child_base = child_end;
    }
    Ok(ControlFlow::Continue(()))
}

/// Leaf-relative bounds of `start..end` for a leaf of `len` rows at `base`.
fn local_range(base: usize, len: usize, start: usize, end: usize) -> (usize, usize) {
    let local_start = start.saturating_sub(base).min(len);
    let local_end = end.saturating_sub(base).min(len);
    (local_start, local_end.max(local_start))
}

pub fn tree_find_first<L: TreeLeaf, A: Allocator>(
    alloc: &A,
    root: NodeRef,
    value: &L::Value,
    start: usize,
    end: usize,
) -> Result<Option<usize>> {
    let mut found = None;
    visit_leaves::<L, A, _>(alloc, root, start, end, |leaf, base| {
        let (local_start, local_end) = local_range(base, leaf.len(alloc)?, start, end);
        if let Some(hit) = leaf.find_first(alloc, value, local_start, local_end)? {
            found = Some(base + hit);
            return Ok(ControlFlow::Break(()));
        }
        Ok(ControlFlow::Continue(()))
    })?;
    Ok(found)
}

/// Appends every absolute row in `start..end` holding `value` to `out`, in
/// ascending order.
pub fn tree_find_all<L: TreeLeaf, A: Allocator>(
    alloc: &A,
    root: NodeRef,
    value: &L::Value,
    start: usize,
    end: usize,
    out: &mut Vec<usize>,
) -> Result<()> {
    visit_leaves::<L, A, _>(alloc, root, start, end, |leaf, base| {
        let (local_start, local_end) = local_range(base, leaf.len(alloc)?, start, end);
        leaf.find_all(alloc, value, base, local_start, local_end, out)?;
        Ok(ControlFlow::Continue(()))
    })?;
    Ok(())
}

pub fn tree_count<L: TreeLeaf, A: Allocator>(
    alloc: &A,
    root: NodeRef,
    value: &L::Value,
) -> Result<usize> {
    let mut total = 0;
    visit_leaves::<L, A, _>(alloc, root, 0, usize::MAX, |leaf, _| {
        total += leaf.count(alloc, value)?;
        Ok(ControlFlow::Continue(()))
    })?;
    Ok(total)
}
