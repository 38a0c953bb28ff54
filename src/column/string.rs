//! # String Column
//!
//! Positional column of strings that picks its leaf encoding from the data.
//! A new column is a single [`ShortLeaf`]; the first value of 16 bytes or
//! more promotes that leaf to a [`LongLeaf`]; past one leaf's capacity the
//! root becomes an [`InnerNode`] and the tree engine takes over.
//!
//! ```text
//!   Root::Short ──(value >= 16 bytes)──> Root::Long
//!        │                                   │
//!        └──────(size > leaf capacity)───────┴──> Root::Inner
//!                                                     │
//!        Root::Short <──────────(clear)───────────────┘
//! ```
//!
//! Leaves under an inner node promote independently; a promoted leaf
//! repoints its parent slot itself.
//!
//! ## Promotion
//!
//! 1. Copy every row of the short leaf into a bump arena
//! 2. Apply the pending set/insert to the staged rows
//! 3. Write a new long leaf in one pass
//! 4. Repoint the parent slot (or the column root) at the new leaf
//! 5. Free the short leaf
//!
//! The handle is swapped wholesale in step 4, so no caller ever observes a
//! half-promoted leaf.
//!
//! ## Index Synchronization
//!
//! With an index attached, `set` and `delete` read the current value and
//! hand it to the index before the tree is touched; `insert` updates the
//! tree first. See [`StringIndex`] for why the order matters.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use eyre::{bail, ensure, eyre, Result};
use tracing::debug;

use crate::config::{ColumnConfig, SHORT_STRING_LIMIT};
use crate::index::{StringIndex, ValueSource};
use crate::node::{node_type_of, InnerNode, LongLeaf, NodeType, ParentLink, ShortLeaf};
use crate::storage::{Allocator, NodeRef};
use crate::tree::{
    tree_count, tree_delete, tree_destroy, tree_find_all, tree_find_first, tree_get,
    tree_insert, tree_set, TreeLeaf,
};

fn as_str(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| eyre!("stored value is not valid UTF-8: {}", e))
}

fn check_value(value: &str) -> Result<()> {
    ensure!(
        !value.as_bytes().contains(&0),
        "string values may not contain NUL bytes"
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafRepr {
    Short(ShortLeaf),
    Long(LongLeaf),
}

enum Pending<'v> {
    Set(usize, &'v [u8]),
    Insert(usize, &'v [u8]),
    Extend(&'v [&'v [u8]]),
}

/// A string leaf of either encoding, plus the inner-node slot pointing at
/// it when it is not the column root.
#[derive(Debug, Clone, Copy)]
pub struct StringLeaf {
    repr: LeafRepr,
    parent: Option<ParentLink>,
}

impl StringLeaf {
    pub fn is_long(&self) -> bool {
        matches!(self.repr, LeafRepr::Long(_))
    }

    fn bytes<'a, A: Allocator>(&self, alloc: &'a A, ndx: usize) -> Result<&'a [u8]> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.get(alloc, ndx),
            LeafRepr::Long(leaf) => leaf.get(alloc, ndx),
        }
    }

    fn values_in<'b, A: Allocator>(
        &self,
        alloc: &A,
        bump: &'b Bump,
    ) -> Result<BumpVec<'b, &'b [u8]>> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.values_in(alloc, bump),
            LeafRepr::Long(leaf) => leaf.values_in(alloc, bump),
        }
    }

    fn leaf_set<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &[u8]) -> Result<()> {
        match self.repr {
            LeafRepr::Long(leaf) => leaf.set(alloc, ndx, value),
            LeafRepr::Short(leaf) if value.len() < SHORT_STRING_LIMIT => leaf.set(alloc, ndx, value),
            LeafRepr::Short(leaf) => {
                let len = leaf.len(alloc)?;
                ensure!(
                    ndx < len,
                    "short leaf index {} out of bounds (count={})",
                    ndx,
                    len
                );
                self.promote(alloc, leaf, Pending::Set(ndx, value))
            }
        }
    }

    fn leaf_insert<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &[u8]) -> Result<()> {
        match self.repr {
            LeafRepr::Long(leaf) => leaf.insert(alloc, ndx, value),
            LeafRepr::Short(leaf) if value.len() < SHORT_STRING_LIMIT => {
                leaf.insert(alloc, ndx, value)
            }
            LeafRepr::Short(leaf) => {
                let len = leaf.len(alloc)?;
                ensure!(
                    ndx <= len,
                    "short leaf insert index {} out of bounds (count={})",
                    ndx,
                    len
                );
                self.promote(alloc, leaf, Pending::Insert(ndx, value))
            }
        }
    }

    /// Replaces `short` with a long leaf holding its rows plus `pending`.
    fn promote<A: Allocator>(
        &mut self,
        alloc: &mut A,
        short: ShortLeaf,
        pending: Pending<'_>,
    ) -> Result<()> {
        let long = {
            let bump = Bump::new();
            let mut values = short.values_in(alloc, &bump)?;
            match pending {
                Pending::Set(ndx, value) => values[ndx] = value,
                Pending::Insert(ndx, value) => values.insert(ndx, value),
                Pending::Extend(more) => values.extend_from_slice(more),
            }
            LongLeaf::create_from(alloc, &values)?
        };

        if let Some(parent) = self.parent {
            parent.update_child_ref(alloc, long.node_ref())?;
        }
        self.repr = LeafRepr::Long(long);
        short.destroy(alloc)?;

        debug!(
            old = %short.node_ref(),
            new = %long.node_ref(),
            "promoted short leaf to long leaf"
        );
        Ok(())
    }
}

impl TreeLeaf for StringLeaf {
    type Value = str;
    type Ref<'a> = &'a str;

    fn create<A: Allocator>(alloc: &mut A) -> Result<Self> {
        Ok(Self {
            repr: LeafRepr::Short(ShortLeaf::create(alloc)?),
            parent: None,
        })
    }

    fn open<A: Allocator>(alloc: &A, node: NodeRef, parent: Option<ParentLink>) -> Result<Self> {
        let repr = match node_type_of(alloc, node)? {
            NodeType::ShortLeaf => LeafRepr::Short(ShortLeaf::open(alloc, node)?),
            NodeType::LongLeaf => LeafRepr::Long(LongLeaf::open(alloc, node)?),
            other => bail!("expected a string leaf at {}, got {:?}", node, other),
        };
        Ok(Self { repr, parent })
    }

    fn node_ref(&self) -> NodeRef {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.node_ref(),
            LeafRepr::Long(leaf) => leaf.node_ref(),
        }
    }

    fn len<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.len(alloc),
            LeafRepr::Long(leaf) => leaf.len(alloc),
        }
    }

    fn get<'a, A: Allocator>(&self, alloc: &'a A, ndx: usize) -> Result<&'a str> {
        as_str(self.bytes(alloc, ndx)?)
    }

    fn set<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &str) -> Result<()> {
        self.leaf_set(alloc, ndx, value.as_bytes())
    }

    fn insert<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &str) -> Result<()> {
        self.leaf_insert(alloc, ndx, value.as_bytes())
    }

    fn delete<A: Allocator>(&mut self, alloc: &mut A, ndx: usize) -> Result<()> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.delete(alloc, ndx),
            LeafRepr::Long(leaf) => leaf.delete(alloc, ndx),
        }
    }

    fn truncate<A: Allocator>(&mut self, alloc: &mut A, len: usize) -> Result<()> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.truncate(alloc, len),
            LeafRepr::Long(leaf) => leaf.truncate(alloc, len),
        }
    }

    fn split_off<A: Allocator>(&mut self, alloc: &mut A, at: usize) -> Result<Self> {
        let bump = Bump::new();
        let values = self.values_in(alloc, &bump)?;
        ensure!(
            at <= values.len(),
            "string leaf split point {} out of bounds (count={})",
            at,
            values.len()
        );

        let repr = match self.repr {
            LeafRepr::Short(_) => {
                let leaf = ShortLeaf::create(alloc)?;
                for value in &values[at..] {
                    leaf.add(alloc, value)?;
                }
                LeafRepr::Short(leaf)
            }
            LeafRepr::Long(_) => LeafRepr::Long(LongLeaf::create_from(alloc, &values[at..])?),
        };
        TreeLeaf::truncate(self, alloc, at)?;

        Ok(Self { repr, parent: None })
    }

    /// A long `src` makes this leaf long, even when every copied value is short.
    fn append_from<A: Allocator>(&mut self, alloc: &mut A, src: &Self) -> Result<()> {
        let bump = Bump::new();
        let values = src.values_in(alloc, &bump)?;

        match self.repr {
            LeafRepr::Long(leaf) => leaf.extend(alloc, &values),
            LeafRepr::Short(leaf)
                if !src.is_long() && values.iter().all(|v| v.len() < SHORT_STRING_LIMIT) =>
            {
                for value in values.iter() {
                    leaf.add(alloc, value)?;
                }
                Ok(())
            }
            LeafRepr::Short(leaf) => self.promote(alloc, leaf, Pending::Extend(&values)),
        }
    }

    fn find_first<A: Allocator>(
        &self,
        alloc: &A,
        value: &str,
        start: usize,
        end: usize,
    ) -> Result<Option<usize>> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.find_first(alloc, value.as_bytes(), start, end),
            LeafRepr::Long(leaf) => leaf.find_first(alloc, value.as_bytes(), start, end),
        }
    }

    fn find_all<A: Allocator>(
        &self,
        alloc: &A,
        value: &str,
        add_offset: usize,
        start: usize,
        end: usize,
        out: &mut Vec<usize>,
    ) -> Result<()> {
        match self.repr {
            LeafRepr::Short(leaf) => {
                leaf.find_all(alloc, value.as_bytes(), add_offset, start, end, out)
            }
            LeafRepr::Long(leaf) => {
                leaf.find_all(alloc, value.as_bytes(), add_offset, start, end, out)
            }
        }
    }

    fn count<A: Allocator>(&self, alloc: &A, value: &str) -> Result<usize> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.count(alloc, value.as_bytes()),
            LeafRepr::Long(leaf) => leaf.count(alloc, value.as_bytes()),
        }
    }

    fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        match self.repr {
            LeafRepr::Short(leaf) => leaf.destroy(alloc),
            LeafRepr::Long(leaf) => leaf.destroy(alloc),
        }
    }
}

/// Reads column values by row through the current root reference.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnValues {
    root: NodeRef,
}

impl ValueSource for ColumnValues {
    fn value<'a, A: Allocator>(&'a self, alloc: &'a A, row: usize) -> Result<&'a [u8]> {
        Ok(tree_get::<StringLeaf, A>(alloc, self.root, row)?.as_bytes())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Root {
    Short(ShortLeaf),
    Long(LongLeaf),
    Inner(InnerNode),
}

impl Root {
    fn open<A: Allocator>(alloc: &A, node: NodeRef) -> Result<Self> {
        Ok(match node_type_of(alloc, node)? {
            NodeType::ShortLeaf => Root::Short(ShortLeaf::open(alloc, node)?),
            NodeType::LongLeaf => Root::Long(LongLeaf::open(alloc, node)?),
            NodeType::InnerNode => Root::Inner(InnerNode::open(alloc, node)?),
            other => bail!("expected a string column at {}, got {:?}", node, other),
        })
    }

    pub(crate) fn node_ref(&self) -> NodeRef {
        match self {
            Root::Short(leaf) => leaf.node_ref(),
            Root::Long(leaf) => leaf.node_ref(),
            Root::Inner(inner) => inner.node_ref(),
        }
    }

    fn node_type(&self) -> NodeType {
        match self {
            Root::Short(_) => NodeType::ShortLeaf,
            Root::Long(_) => NodeType::LongLeaf,
            Root::Inner(_) => NodeType::InnerNode,
        }
    }
}

#[derive(Debug)]
pub struct StringColumn {
    pub(crate) root: Root,
    parent: Option<ParentLink>,
    pub(crate) index: Option<StringIndex>,
    config: ColumnConfig,
}

impl StringColumn {
    pub fn new<A: Allocator>(alloc: &mut A) -> Result<Self> {
        Self::with_config(alloc, ColumnConfig::default())
    }

    pub fn with_config<A: Allocator>(alloc: &mut A, config: ColumnConfig) -> Result<Self> {
        Ok(Self {
            root: Root::Short(ShortLeaf::create(alloc)?),
            parent: None,
            index: None,
            config,
        })
    }

    /// Re-opens a column whose root is `node`. The representation is read
    /// from the node header.
    pub fn from_ref<A: Allocator>(alloc: &A, node: NodeRef, config: ColumnConfig) -> Result<Self> {
        Ok(Self {
            root: Root::open(alloc, node)?,
            parent: None,
            index: None,
            config,
        })
    }

    /// Attaches the column to the inner-node slot that references its root.
    /// Root replacements are written through to that slot.
    pub fn set_parent(&mut self, parent: Option<ParentLink>) {
        self.parent = parent;
    }

    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    pub fn config(&self) -> ColumnConfig {
        self.config
    }

    pub fn node_ref(&self) -> NodeRef {
        self.root.node_ref()
    }

    pub fn node_type(&self) -> NodeType {
        self.root.node_type()
    }

    pub(crate) fn values(&self) -> ColumnValues {
        ColumnValues {
            root: self.root.node_ref(),
        }
    }

    /// Installs `node` as the column root and repoints the parent slot.
    pub fn update_ref<A: Allocator>(&mut self, alloc: &mut A, node: NodeRef) -> Result<()> {
        if node == self.root.node_ref() {
            return Ok(());
        }
        let root = Root::open(alloc, node)?;
        if let Some(parent) = self.parent {
            parent.update_child_ref(alloc, node)?;
        }
        debug!(
            old = %self.root.node_ref(),
            new = %node,
            node_type = ?root.node_type(),
            "column root replaced"
        );
        self.root = root;
        Ok(())
    }

    pub fn size<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        match self.root {
            Root::Short(leaf) => leaf.len(alloc),
            Root::Long(leaf) => leaf.len(alloc),
            Root::Inner(inner) => inner.size(alloc),
        }
    }

    pub fn is_empty<A: Allocator>(&self, alloc: &A) -> Result<bool> {
        Ok(self.size(alloc)? == 0)
    }

    pub fn get<'a, A: Allocator>(&self, alloc: &'a A, row: usize) -> Result<&'a str> {
        match self.root {
            Root::Short(leaf) => as_str(leaf.get(alloc, row)?),
            Root::Long(leaf) => as_str(leaf.get(alloc, row)?),
            Root::Inner(inner) => tree_get::<StringLeaf, A>(alloc, inner.node_ref(), row),
        }
    }

    pub fn set<A: Allocator>(&mut self, alloc: &mut A, row: usize, value: &str) -> Result<()> {
        check_value(value)?;
        let size = self.size(alloc)?;
        ensure!(row < size, "row {} out of bounds (size={})", row, size);

        let source = self.values();
        if let Some(index) = self.index.as_mut() {
            let old = source.value(alloc, row)?.to_vec();
            index.set(alloc, &source, row, &old, value.as_bytes())?;
        }

        let root = tree_set::<StringLeaf, A>(alloc, self.root.node_ref(), row, value)?;
        self.update_ref(alloc, root)
    }

    pub fn insert<A: Allocator>(&mut self, alloc: &mut A, row: usize, value: &str) -> Result<()> {
        check_value(value)?;
        let size = self.size(alloc)?;
        ensure!(row <= size, "insert row {} out of bounds (size={})", row, size);

        let root = tree_insert::<StringLeaf, A>(
            alloc,
            self.root.node_ref(),
            row,
            value,
            self.config.leaf_capacity(),
        )?;
        self.update_ref(alloc, root)?;

        let source = self.values();
        if let Some(index) = self.index.as_mut() {
            index.insert(alloc, &source, row, value.as_bytes(), row == size)?;
        }
        Ok(())
    }

    pub fn add<A: Allocator>(&mut self, alloc: &mut A, value: &str) -> Result<()> {
        let size = self.size(alloc)?;
        self.insert(alloc, size, value)
    }

    pub fn delete<A: Allocator>(&mut self, alloc: &mut A, row: usize) -> Result<()> {
        let size = self.size(alloc)?;
        ensure!(row < size, "row {} out of bounds (size={})", row, size);

        let source = self.values();
        if let Some(index) = self.index.as_mut() {
            let old = source.value(alloc, row)?.to_vec();
            index.delete(alloc, &source, row, &old, row + 1 == size)?;
        }

        let root = tree_delete::<StringLeaf, A>(
            alloc,
            self.root.node_ref(),
            row,
            self.config.leaf_capacity(),
        )?;
        self.update_ref(alloc, root)
    }

    /// Removes every row. An inner-node column reverts to an empty short leaf.
    pub fn clear<A: Allocator>(&mut self, alloc: &mut A) -> Result<()> {
        match self.root {
            Root::Inner(inner) => {
                tree_destroy(alloc, inner.node_ref())?;
                let leaf = ShortLeaf::create(alloc)?;
                self.root = Root::Short(leaf);
                if let Some(parent) = self.parent {
                    parent.update_child_ref(alloc, leaf.node_ref())?;
                }
                debug!(root = %leaf.node_ref(), "cleared column back to a short leaf");
            }
            Root::Short(leaf) => leaf.clear(alloc)?,
            Root::Long(leaf) => leaf.clear(alloc)?,
        }

        if let Some(index) = self.index.as_mut() {
            index.clear(alloc)?;
        }
        Ok(())
    }

    /// Truncates a leaf-shaped column to `len` rows.
    pub fn resize<A: Allocator>(&mut self, alloc: &mut A, len: usize) -> Result<()> {
        ensure!(
            !matches!(self.root, Root::Inner(_)),
            "resize is only available on a leaf-shaped column"
        );
        let size = self.size(alloc)?;
        ensure!(
            len <= size,
            "cannot resize a column of {} rows to {}",
            size,
            len
        );

        let source = self.values();
        if let Some(index) = self.index.as_mut() {
            for row in (len..size).rev() {
                let old = source.value(alloc, row)?.to_vec();
                index.delete(alloc, &source, row, &old, true)?;
            }
        }

        match self.root {
            Root::Short(leaf) => leaf.truncate(alloc, len),
            Root::Long(leaf) => leaf.truncate(alloc, len),
            Root::Inner(_) => bail!("resize is only available on a leaf-shaped column"),
        }
    }

    /// Appends `count` empty strings to an empty, unindexed column.
    pub fn fill<A: Allocator>(&mut self, alloc: &mut A, count: usize) -> Result<()> {
        ensure!(self.is_empty(alloc)?, "fill requires an empty column");
        ensure!(self.index.is_none(), "fill is not available on an indexed column");

        for row in 0..count {
            let root = tree_insert::<StringLeaf, A>(
                alloc,
                self.root.node_ref(),
                row,
                "",
                self.config.leaf_capacity(),
            )?;
            self.update_ref(alloc, root)?;
        }
        Ok(())
    }

    pub fn count<A: Allocator>(&self, alloc: &A, value: &str) -> Result<usize> {
        if let Some(index) = &self.index {
            return index.count(alloc, &self.values(), value.as_bytes());
        }

        match self.root {
            Root::Short(leaf) => leaf.count(alloc, value.as_bytes()),
            Root::Long(leaf) => leaf.count(alloc, value.as_bytes()),
            Root::Inner(inner) => tree_count::<StringLeaf, A>(alloc, inner.node_ref(), value),
        }
    }

    fn check_range<A: Allocator>(&self, alloc: &A, start: usize, end: usize) -> Result<usize> {
        let size = self.size(alloc)?;
        ensure!(
            start <= end && end <= size,
            "row range {}..{} out of bounds (size={})",
            start,
            end,
            size
        );
        Ok(size)
    }

    pub fn find_first<A: Allocator>(&self, alloc: &A, value: &str) -> Result<Option<usize>> {
        let size = self.size(alloc)?;
        self.find_first_in(alloc, value, 0, size)
    }

    /// First row in `start..end` holding `value`. The index is only used
    /// when the range covers the whole column.
    pub fn find_first_in<A: Allocator>(
        &self,
        alloc: &A,
        value: &str,
        start: usize,
        end: usize,
    ) -> Result<Option<usize>> {
        let size = self.check_range(alloc, start, end)?;
        if let Some(index) = &self.index {
            if start == 0 && end == size {
                return index.find_first(alloc, &self.values(), value.as_bytes());
            }
        }

        match self.root {
            Root::Short(leaf) => leaf.find_first(alloc, value.as_bytes(), start, end),
            Root::Long(leaf) => leaf.find_first(alloc, value.as_bytes(), start, end),
            Root::Inner(inner) => {
                tree_find_first::<StringLeaf, A>(alloc, inner.node_ref(), value, start, end)
            }
        }
    }

    pub fn find_all<A: Allocator>(&self, alloc: &A, value: &str) -> Result<Vec<usize>> {
        let size = self.size(alloc)?;
        self.find_all_in(alloc, value, 0, size)
    }

    /// Every row in `start..end` holding `value`, ascending.
    pub fn find_all_in<A: Allocator>(
        &self,
        alloc: &A,
        value: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<usize>> {
        let size = self.check_range(alloc, start, end)?;
        if let Some(index) = &self.index {
            if start == 0 && end == size {
                return index.find_all(alloc, &self.values(), value.as_bytes());
            }
        }

        let mut out = Vec::new();
        match self.root {
            Root::Short(leaf) => leaf.find_all(alloc, value.as_bytes(), 0, start, end, &mut out)?,
            Root::Long(leaf) => leaf.find_all(alloc, value.as_bytes(), 0, start, end, &mut out)?,
            Root::Inner(inner) => tree_find_all::<StringLeaf, A>(
                alloc,
                inner.node_ref(),
                value,
                start,
                end,
                &mut out,
            )?,
        }
        Ok(out)
    }

    /// Byte-wise equality of every row.
    pub fn equals<A: Allocator>(&self, alloc: &A, other: &StringColumn) -> Result<bool> {
        let size = self.size(alloc)?;
        if other.size(alloc)? != size {
            return Ok(false);
        }
        for row in 0..size {
            if self.get(alloc, row)? != other.get(alloc, row)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&StringIndex> {
        self.index.as_ref()
    }

    /// Builds an index over the current rows.
    pub fn create_index<A: Allocator>(&mut self, alloc: &mut A) -> Result<()> {
        ensure!(self.index.is_none(), "column already has an index");

        let size = self.size(alloc)?;
        let mut index = StringIndex::create(alloc, self.config)?;
        index.build(alloc, &self.values(), size)?;
        self.index = Some(index);
        Ok(())
    }

    /// Attaches an index previously built for this column.
    pub fn set_index_ref<A: Allocator>(&mut self, alloc: &mut A, node: NodeRef) -> Result<()> {
        ensure!(self.index.is_none(), "column already has an index");

        let index = StringIndex::from_ref(alloc, node, self.config)?;
        debug!(index = %node, column = %self.node_ref(), "attached string index");
        self.index = Some(index);
        Ok(())
    }

    /// Detaches and frees the index.
    pub fn remove_index<A: Allocator>(&mut self, alloc: &mut A) -> Result<()> {
        match self.index.take() {
            Some(index) => index.destroy(alloc),
            None => bail!("column has no index"),
        }
    }

    /// Frees the whole tree and the index.
    pub fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        tree_destroy(alloc, self.root.node_ref())?;
        if let Some(index) = self.index {
            index.destroy(alloc)?;
        }
        Ok(())
    }
}
