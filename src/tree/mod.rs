//! # Column Tree Engine
//!
//! Generic positional B+tree used by every column type. Rows are addressed
//! by position only; inner nodes route a row to its leaf through cumulative
//! row counts (see [`InnerNode`](crate::node::InnerNode)), and the leaf
//! itself is supplied by the column through the [`TreeLeaf`] capability set.
//!
//! ## Shape
//!
//! ```text
//!                      InnerNode [ (L0, 3) (L1, 7) (L2, 9) ]
//!                     /              |               \
//!           leaf rows 0..3     leaf rows 3..7     leaf rows 7..9
//! ```
//!
//! A column is a single leaf until it holds more rows than one leaf can
//! contain, and becomes a single leaf again once deletes bring it back to
//! that size.
//!
//! ## Insert
//!
//! 1. Descend with a path stack, choosing the child by cumulative offset
//!    (`row == size` routes to the last child)
//! 2. If the leaf has room, insert in place
//! 3. Otherwise split the leaf at the insertion point: rows after it move to
//!    a new right sibling and the value is appended to the left leaf. An
//!    append creates a sibling holding only the new row
//! 4. Walk the path back up, bumping offsets or inserting the new sibling;
//!    inner nodes with more children than the capacity split in half
//! 5. A split that reaches the root grows the tree by one level
//!
//! ## Delete
//!
//! Leaves (and inner nodes) left empty are unlinked and freed. When the root
//! is an inner node and the total size falls to the leaf capacity or less,
//! every leaf is copied into one fresh leaf which becomes the root.
//!
//! ## Root Ownership
//!
//! The engine never stores the root. Every structural entry point takes the
//! current root reference and returns the root after the operation, which
//! may be a different node (growth, collapse, or leaf promotion). Callers
//! install the returned reference.
//!
//! ## Path Stack
//!
//! Descent records `(inner node, child index)` pairs in a
//! `SmallVec<[PathEntry; MAX_TREE_DEPTH]>`, so trees up to eight levels deep
//! never touch the heap while walking back up.

mod ops;
mod scan;

use eyre::Result;
use smallvec::SmallVec;

use crate::config::MAX_TREE_DEPTH;
use crate::node::ParentLink;
use crate::storage::{Allocator, NodeRef};

pub(crate) use ops::leaf_refs;
pub use ops::{tree_delete, tree_destroy, tree_get, tree_insert, tree_set, tree_size};
pub use scan::{tree_count, tree_find_all, tree_find_first, visit_leaves};

/// Leaf-level operations a column supplies to the engine. Every row index is
/// relative to the leaf.
///
/// Mutating methods take `&mut self` because a leaf may replace its backing
/// node (string leaves promote from the short to the long encoding). A leaf
/// opened with a parent link repoints that parent itself when it does.
pub trait TreeLeaf: Sized {
    type Value: ?Sized;
    type Ref<'a>;

    fn create<A: Allocator>(alloc: &mut A) -> Result<Self>;

    fn open<A: Allocator>(alloc: &A, node: NodeRef, parent: Option<ParentLink>) -> Result<Self>;

    fn node_ref(&self) -> NodeRef;

    fn len<A: Allocator>(&self, alloc: &A) -> Result<usize>;

    fn get<'a, A: Allocator>(&self, alloc: &'a A, ndx: usize) -> Result<Self::Ref<'a>>;

    fn set<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &Self::Value) -> Result<()>;

    fn insert<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &Self::Value)
        -> Result<()>;

    fn delete<A: Allocator>(&mut self, alloc: &mut A, ndx: usize) -> Result<()>;

    /// Drops every row at or after `len`.
    fn truncate<A: Allocator>(&mut self, alloc: &mut A, len: usize) -> Result<()>;

    /// Moves rows `at..` into a new, unparented leaf.
    fn split_off<A: Allocator>(&mut self, alloc: &mut A, at: usize) -> Result<Self>;

    /// Appends every row of `src` to this leaf.
    fn append_from<A: Allocator>(&mut self, alloc: &mut A, src: &Self) -> Result<()>;

    fn find_first<A: Allocator>(
        &self,
        alloc: &A,
        value: &Self::Value,
        start: usize,
        end: usize,
    ) -> Result<Option<usize>>;

    fn find_all<A: Allocator>(
        &self,
        alloc: &A,
        value: &Self::Value,
        add_offset: usize,
        start: usize,
        end: usize,
        out: &mut Vec<usize>,
    ) -> Result<()>;

    fn count<A: Allocator>(&self, alloc: &A, value: &Self::Value) -> Result<usize>;

    fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PathEntry {
    pub node: NodeRef,
    pub ndx: usize,
}

impl PathEntry {
    pub fn link(&self) -> ParentLink {
        ParentLink::new(self.node, self.ndx)
    }
}

pub(crate) type PathStack = SmallVec<[PathEntry; MAX_TREE_DEPTH]>;
