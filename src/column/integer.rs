//! # Integer Column
//!
//! Positional `u64` column on the shared tree engine. It carries the row
//! lists of [`StringIndex`](crate::index::StringIndex) and the key-index list
//! produced by auto-enumeration, so it only needs the plain leaf operations
//! plus a bulk adjust used when rows shift under an index.

use eyre::{bail, ensure, Result};

use crate::config::ColumnConfig;
use crate::node::{node_type_of, IntLeaf, NodeType, ParentLink};
use crate::storage::{Allocator, NodeRef};
use crate::tree::{
    tree_count, tree_delete, tree_destroy, tree_find_all, tree_find_first, tree_get,
    tree_insert, tree_set, tree_size, TreeLeaf,
};

impl TreeLeaf for IntLeaf {
    type Value = u64;
    type Ref<'a> = u64;

    fn create<A: Allocator>(alloc: &mut A) -> Result<Self> {
        IntLeaf::create(alloc)
    }

    fn open<A: Allocator>(alloc: &A, node: NodeRef, _parent: Option<ParentLink>) -> Result<Self> {
        IntLeaf::open(alloc, node)
    }

    fn node_ref(&self) -> NodeRef {
        IntLeaf::node_ref(self)
    }

    fn len<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        IntLeaf::len(self, alloc)
    }

    fn get<'a, A: Allocator>(&self, alloc: &'a A, ndx: usize) -> Result<u64> {
        IntLeaf::get(self, alloc, ndx)
    }

    fn set<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &u64) -> Result<()> {
        IntLeaf::set(self, alloc, ndx, *value)
    }

    fn insert<A: Allocator>(&mut self, alloc: &mut A, ndx: usize, value: &u64) -> Result<()> {
        IntLeaf::insert(self, alloc, ndx, *value)
    }

    fn delete<A: Allocator>(&mut self, alloc: &mut A, ndx: usize) -> Result<()> {
        IntLeaf::delete(self, alloc, ndx)
    }

    fn truncate<A: Allocator>(&mut self, alloc: &mut A, len: usize) -> Result<()> {
        IntLeaf::truncate(self, alloc, len)
    }

    fn split_off<A: Allocator>(&mut self, alloc: &mut A, at: usize) -> Result<Self> {
        let tail = self.values(alloc, at)?;
        let right = IntLeaf::create(alloc)?;
        for value in tail {
            right.add(alloc, value)?;
        }
        IntLeaf::truncate(self, alloc, at)?;
        Ok(right)
    }

    fn append_from<A: Allocator>(&mut self, alloc: &mut A, src: &Self) -> Result<()> {
        for value in src.values(alloc, 0)? {
            self.add(alloc, value)?;
        }
        Ok(())
    }

    fn find_first<A: Allocator>(
        &self,
        alloc: &A,
        value: &u64,
        start: usize,
        end: usize,
    ) -> Result<Option<usize>> {
        IntLeaf::find_first(self, alloc, *value, start, end)
    }

    fn find_all<A: Allocator>(
        &self,
        alloc: &A,
        value: &u64,
        add_offset: usize,
        start: usize,
        end: usize,
        out: &mut Vec<usize>,
    ) -> Result<()> {
        IntLeaf::find_all(self, alloc, *value, add_offset, start, end, out)
    }

    fn count<A: Allocator>(&self, alloc: &A, value: &u64) -> Result<usize> {
        IntLeaf::count(self, alloc, *value)
    }

    fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        IntLeaf::destroy(self, alloc)
    }
}

impl IntLeaf {
    /// Values from `from` to the end, copied out.
    fn values<A: Allocator>(&self, alloc: &A, from: usize) -> Result<Vec<u64>> {
        let len = IntLeaf::len(self, alloc)?;
        ensure!(
            from <= len,
            "int leaf split point {} out of bounds (count={})",
            from,
            len
        );
        (from..len).map(|ndx| IntLeaf::get(self, alloc, ndx)).collect()
    }

    /// Adds `delta` to every value `>= limit`.
    fn adjust_ge<A: Allocator>(&self, alloc: &mut A, limit: u64, delta: i64) -> Result<()> {
        for ndx in 0..IntLeaf::len(self, alloc)? {
            let value = IntLeaf::get(self, alloc, ndx)?;
            if value >= limit {
                let adjusted = value as i64 + delta;
                ensure!(adjusted >= 0, "adjusting {} by {} underflows", value, delta);
                IntLeaf::set(self, alloc, ndx, adjusted as u64)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntColumn {
    root: NodeRef,
    config: ColumnConfig,
}

impl IntColumn {
    pub fn new<A: Allocator>(alloc: &mut A) -> Result<Self> {
        Self::with_config(alloc, ColumnConfig::default())
    }

    pub fn with_config<A: Allocator>(alloc: &mut A, config: ColumnConfig) -> Result<Self> {
        let root = IntLeaf::create(alloc)?.node_ref();
        Ok(Self { root, config })
    }

    /// Re-opens a column previously created in `alloc`.
    pub fn from_ref<A: Allocator>(alloc: &A, node: NodeRef, config: ColumnConfig) -> Result<Self> {
        match node_type_of(alloc, node)? {
            NodeType::IntLeaf | NodeType::InnerNode => Ok(Self { root: node, config }),
            other => bail!("expected an integer column at {}, got {:?}", node, other),
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        self.root
    }

    pub fn config(&self) -> ColumnConfig {
        self.config
    }

    pub fn size<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        tree_size::<IntLeaf, A>(alloc, self.root)
    }

    pub fn is_empty<A: Allocator>(&self, alloc: &A) -> Result<bool> {
        Ok(self.size(alloc)? == 0)
    }

    pub fn get<A: Allocator>(&self, alloc: &A, row: usize) -> Result<u64> {
        tree_get::<IntLeaf, A>(alloc, self.root, row)
    }

    pub fn set<A: Allocator>(&mut self, alloc: &mut A, row: usize, value: u64) -> Result<()> {
        self.root = tree_set::<IntLeaf, A>(alloc, self.root, row, &value)?;
        Ok(())
    }

    pub fn insert<A: Allocator>(&mut self, alloc: &mut A, row: usize, value: u64) -> Result<()> {
        self.root = tree_insert::<IntLeaf, A>(
            alloc,
            self.root,
            row,
            &value,
            self.config.leaf_capacity(),
        )?;
        Ok(())
    }

    pub fn add<A: Allocator>(&mut self, alloc: &mut A, value: u64) -> Result<()> {
        let size = self.size(alloc)?;
        self.insert(alloc, size, value)
    }

    pub fn delete<A: Allocator>(&mut self, alloc: &mut A, row: usize) -> Result<()> {
        self.root = tree_delete::<IntLeaf, A>(alloc, self.root, row, self.config.leaf_capacity())?;
        Ok(())
    }

    pub fn clear<A: Allocator>(&mut self, alloc: &mut A) -> Result<()> {
        if node_type_of(alloc, self.root)? == NodeType::InnerNode {
            tree_destroy(alloc, self.root)?;
            self.root = IntLeaf::create(alloc)?.node_ref();
            return Ok(());
        }
        IntLeaf::open(alloc, self.root)?.clear(alloc)
    }

    /// Adds `delta` to every stored value `>= limit`.
    pub fn adjust_ge<A: Allocator>(&mut self, alloc: &mut A, limit: u64, delta: i64) -> Result<()> {
        for node in crate::tree::leaf_refs(alloc, self.root)? {
            IntLeaf::open(alloc, node)?.adjust_ge(alloc, limit, delta)?;
        }
        Ok(())
    }

    pub fn find_first<A: Allocator>(&self, alloc: &A, value: u64) -> Result<Option<usize>> {
        let size = self.size(alloc)?;
        tree_find_first::<IntLeaf, A>(alloc, self.root, &value, 0, size)
    }

    pub fn find_all<A: Allocator>(&self, alloc: &A, value: u64) -> Result<Vec<usize>> {
        let size = self.size(alloc)?;
        let mut out = Vec::new();
        tree_find_all::<IntLeaf, A>(alloc, self.root, &value, 0, size, &mut out)?;
        Ok(out)
    }

    pub fn count<A: Allocator>(&self, alloc: &A, value: u64) -> Result<usize> {
        tree_count::<IntLeaf, A>(alloc, self.root, &value)
    }

    pub fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        tree_destroy(alloc, self.root)
    }
}
