//! # Node Formats
//!
//! Serialized layouts of every node a column tree is built from. A node is a
//! plain byte buffer owned by the allocator; the handles in this module are
//! `Copy` wrappers around a [`NodeRef`](crate::storage::NodeRef) and borrow
//! the allocator per call.
//!
//! ## Node Types
//!
//! - **ShortLeaf**: fixed-width packed slots for strings shorter than 16 bytes
//! - **LongLeaf**: end-offset array plus a byte blob, no length limit
//! - **InnerNode**: `(child, cumulative offset)` pairs above the leaves
//! - **IntLeaf**: `u64` slots, used by index row lists and enumeration output
//!
//! ## Common Header
//!
//! ```text
//! +-----------+-------+----------+-------------+----------------------+
//! | node_type | width | reserved | count (u32) | payload ...          |
//! +-----------+-------+----------+-------------+----------------------+
//!      1B        1B       2B          4B
//! ```
//!
//! The representation of a node is always recoverable with
//! [`node_type_of`] without decoding the payload.
//!
//! ## Module Organization
//!
//! - `header`: [`NodeHeader`], [`NodeType`] and buffer helpers
//! - `short`: [`ShortLeaf`]
//! - `long`: [`LongLeaf`]
//! - `inner`: [`InnerNode`] and [`ParentLink`]
//! - `int`: [`IntLeaf`]

mod header;
mod inner;
mod int;
mod long;
mod short;

pub use header::{node_type_of, NodeHeader, NodeType};
pub use inner::{InnerNode, InnerSlot, ParentLink};
pub use int::IntLeaf;
pub use long::LongLeaf;
pub use short::{slot_width_for, ShortLeaf};
