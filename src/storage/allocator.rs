//! # Allocator Interface
//!
//! The column layer consumes storage only through this trait. A [`NodeRef`]
//! is meaningless without the allocator that issued it.

use std::fmt;

use eyre::Result;

/// Opaque reference to an allocator-managed node buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeRef(u64);

impl NodeRef {
    pub const NULL: NodeRef = NodeRef(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait Allocator {
    /// Allocates a zero-filled buffer of `size` bytes.
    fn alloc(&mut self, size: usize) -> Result<NodeRef>;

    fn translate(&self, node: NodeRef) -> Result<&[u8]>;

    fn translate_mut(&mut self, node: NodeRef) -> Result<&mut [u8]>;

    /// Grows or shrinks the buffer behind `node`. New bytes are zero and the
    /// reference remains valid.
    fn resize(&mut self, node: NodeRef, size: usize) -> Result<()>;

    fn free(&mut self, node: NodeRef) -> Result<()>;
}
