//! Structural entry points: get, set, insert, delete, destroy.

use eyre::{ensure, Result};
use smallvec::SmallVec;
use tracing::debug;

use super::{PathEntry, PathStack, TreeLeaf};
use crate::node::{node_type_of, InnerNode, NodeType};
use crate::storage::{Allocator, NodeRef};

enum InsertResult {
    Ok,
    Split { right: NodeRef, rows: usize },
}

/// Descends to the leaf owning `row` and returns it with its leaf row and
/// the path of inner nodes above it. With `for_insert`, `row == size` is
/// accepted and routed to the last leaf.
fn descend<A: Allocator>(
    alloc: &A,
    root: NodeRef,
    row: usize,
    for_insert: bool,
) -> Result<(NodeRef, usize, PathStack)> {
    let mut path: PathStack = SmallVec::new();
    let mut node = root;
    let mut local = row;

    while node_type_of(alloc, node)? == NodeType::InnerNode {
        let inner = InnerNode::open(alloc, node)?;
        let (ndx, child_row) = if for_insert {
            inner.child_for_insert(alloc, local)?
        } else {
            inner.child_for_row(alloc, local)?
        };
        path.push(PathEntry { node, ndx });
        node = inner.child(alloc, ndx)?;
        local = child_row;
    }

    Ok((node, local, path))
}

fn open_leaf<L: TreeLeaf, A: Allocator>(alloc: &A, node: NodeRef, path: &PathStack) -> Result<L> {
    L::open(alloc, node, path.last().map(PathEntry::link))
}

pub fn tree_size<L: TreeLeaf, A: Allocator>(alloc: &A, root: NodeRef) -> Result<usize> {
    match node_type_of(alloc, root)? {
        NodeType::InnerNode => InnerNode::open(alloc, root)?.size(alloc),
        _ => L::open(alloc, root, None)?.len(alloc),
    }
}

pub fn tree_get<'a, L: TreeLeaf, A: Allocator>(
    alloc: &'a A,
    root: NodeRef,
    row: usize,
) -> Result<L::Ref<'a>> {
    let (node, local, path) = descend(alloc, root, row, false)?;
    open_leaf::<L, A>(alloc, node, &path)?.get(alloc, local)
}

/// Overwrites `row` and returns the root afterwards.
pub fn tree_set<L: TreeLeaf, A: Allocator>(
    alloc: &mut A,
    root: NodeRef,
    row: usize,
    value: &L::Value,
) -> Result<NodeRef> {
    let (node, local, path) = descend(alloc, root, row, false)?;
    let mut leaf: L = open_leaf(alloc, node, &path)?;
    leaf.set(alloc, local, value)?;

    if path.is_empty() {
        return Ok(leaf.node_ref());
    }
    Ok(root)
}

/// Inserts `value` before `row` (`row == size` appends) and returns the
/// root afterwards.
pub fn tree_insert<L: TreeLeaf, A: Allocator>(
    alloc: &mut A,
    root: NodeRef,
    row: usize,
    value: &L::Value,
    capacity: usize,
) -> Result<NodeRef> {
    let (node, local, mut path) = descend(alloc, root, row, true)?;
    let mut leaf: L = open_leaf(alloc, node, &path)?;

    let result = insert_into_leaf(alloc, &mut leaf, local, value, capacity)?;
    let mut new_root = if path.is_empty() { leaf.node_ref() } else { root };

    if let InsertResult::Split { right, rows } = propagate_insert(alloc, &mut path, result, capacity)? {
        let left_rows = tree_size::<L, A>(alloc, new_root)?;
        let grown = InnerNode::create(alloc, &[(new_root, left_rows), (right, rows)])?;
        debug!(
            old_root = %new_root,
            new_root = %grown.node_ref(),
            rows = left_rows + rows,
            "root split, tree grew one level"
        );
        new_root = grown.node_ref();
    }

    Ok(new_root)
}

fn insert_into_leaf<L: TreeLeaf, A: Allocator>(
    alloc: &mut A,
    leaf: &mut L,
    ndx: usize,
    value: &L::Value,
    capacity: usize,
) -> Result<InsertResult> {
    let len = leaf.len(alloc)?;
    ensure!(
        ndx <= len,
        "leaf insert index {} out of bounds (count={})",
        ndx,
        len
    );
    if len < capacity {
        leaf.insert(alloc, ndx, value)?;
        return Ok(InsertResult::Ok);
    }

    let (right, rows) = if ndx == len {
        let mut right = L::create(alloc)?;
        right.insert(alloc, 0, value)?;
        (right, 1)
    } else {
        let right = leaf.split_off(alloc, ndx)?;
        leaf.insert(alloc, ndx, value)?;
        (right, len - ndx)
    };

    debug!(
        leaf = %leaf.node_ref(),
        sibling = %right.node_ref(),
        at = ndx,
        moved = rows,
        "split full leaf"
    );
    Ok(InsertResult::Split {
        right: right.node_ref(),
        rows,
    })
}

fn propagate_insert<A: Allocator>(
    alloc: &mut A,
    path: &mut PathStack,
    mut result: InsertResult,
    capacity: usize,
) -> Result<InsertResult> {
    while let Some(entry) = path.pop() {
        let inner = InnerNode::open(alloc, entry.node)?;
        result = match result {
            InsertResult::Ok => {
                inner.adjust_offsets(alloc, entry.ndx, 1)?;
                InsertResult::Ok
            }
            InsertResult::Split { right, rows } => {
                inner.adjust_offsets(alloc, entry.ndx, 1 - rows as isize)?;
                inner.insert_child(alloc, entry.ndx + 1, right, rows)?;
                split_inner_if_full(alloc, inner, capacity)?
            }
        };
    }
    Ok(result)
}

fn split_inner_if_full<A: Allocator>(
    alloc: &mut A,
    inner: InnerNode,
    capacity: usize,
) -> Result<InsertResult> {
    let count = inner.child_count(alloc)?;
    if count <= capacity {
        return Ok(InsertResult::Ok);
    }

    let right = inner.split_off(alloc, count / 2)?;
    let rows = right.size(alloc)?;
    debug!(
        node = %inner.node_ref(),
        sibling = %right.node_ref(),
        children = count,
        "split full inner node"
    );
    Ok(InsertResult::Split {
        right: right.node_ref(),
        rows,
    })
}

/// Removes `row` and returns the root afterwards.
pub fn tree_delete<L: TreeLeaf, A: Allocator>(
    alloc: &mut A,
    root: NodeRef,
    row: usize,
    capacity: usize,
) -> Result<NodeRef> {
    let (node, local, mut path) = descend(alloc, root, row, false)?;
    let mut leaf: L = open_leaf(alloc, node, &path)?;
    leaf.delete(alloc, local)?;

    if path.is_empty() {
        return Ok(leaf.node_ref());
    }

    let mut unlink = leaf.len(alloc)? == 0;
    if unlink {
        debug!(leaf = %leaf.node_ref(), "freeing empty leaf");
        leaf.destroy(alloc)?;
    }

    while let Some(entry) = path.pop() {
        let inner = InnerNode::open(alloc, entry.node)?;
        if unlink {
            inner.remove_child(alloc, entry.ndx)?;
            unlink = !path.is_empty() && inner.child_count(alloc)? == 0;
            if unlink {
                inner.destroy(alloc)?;
            }
        } else {
            inner.adjust_offsets(alloc, entry.ndx, -1)?;
        }
    }

    if tree_size::<L, A>(alloc, root)? <= capacity {
        return collapse::<L, A>(alloc, root);
    }
    Ok(root)
}

/// Copies every row under `root` into one new leaf and frees the old tree.
fn collapse<L: TreeLeaf, A: Allocator>(alloc: &mut A, root: NodeRef) -> Result<NodeRef> {
    let leaves = leaf_refs(alloc, root)?;

    let mut target = L::create(alloc)?;
    for node in leaves {
        let src = L::open(alloc, node, None)?;
        target.append_from(alloc, &src)?;
    }
    tree_destroy(alloc, root)?;

    debug!(old_root = %root, leaf = %target.node_ref(), "collapsed tree into a single leaf");
    Ok(target.node_ref())
}

/// Leaf references under `root`, left to right.
pub(crate) fn leaf_refs<A: Allocator>(alloc: &A, root: NodeRef) -> Result<Vec<NodeRef>> {
    let mut leaves = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node_type_of(alloc, node)? == NodeType::InnerNode {
            let inner = InnerNode::open(alloc, node)?;
            stack.extend(inner.children(alloc)?.into_iter().rev().map(|(child, _)| child));
        } else {
            leaves.push(node);
        }
    }
    Ok(leaves)
}

/// Frees every node of the subtree rooted at `root`.
pub fn tree_destroy<A: Allocator>(alloc: &mut A, root: NodeRef) -> Result<()> {
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node_type_of(alloc, node)? == NodeType::InnerNode {
            let inner = InnerNode::open(alloc, node)?;
            stack.extend(inner.children(alloc)?.into_iter().map(|(child, _)| child));
        }
        alloc.free(node)?;
    }
    Ok(())
}
