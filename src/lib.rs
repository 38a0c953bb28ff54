//! # turcol - Adaptive String Columns
//!
//! turcol stores a positional column of strings in allocator-managed nodes
//! and picks the cheapest encoding the data allows:
//!
//! - **Short leaves**: fixed-width packed slots while every value is shorter
//!   than 16 bytes
//! - **Long leaves**: offset array plus byte blob once any value reaches 16
//!   bytes
//! - **Inner nodes**: a positional B+tree once the column outgrows one leaf
//!
//! ## Quick Start
//!
//! ```ignore
//! use turcol::{SlabAllocator, StringColumn};
//!
//! let mut alloc = SlabAllocator::new();
//! let mut column = StringColumn::new(&mut alloc)?;
//!
//! column.add(&mut alloc, "alpha")?;
//! column.add(&mut alloc, "a value long enough to promote the leaf")?;
//! column.create_index(&mut alloc)?;
//!
//! assert_eq!(column.find_first(&alloc, "alpha")?, Some(0));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  StringColumn  (root variant + index)    │
//! ├──────────────────────┬──────────────────┤
//! │  Tree Engine         │  StringIndex     │
//! │  (generic TreeLeaf)  │  (IntColumn rows)│
//! ├──────────────────────┴──────────────────┤
//! │  Nodes: ShortLeaf LongLeaf Inner IntLeaf │
//! ├─────────────────────────────────────────┤
//! │  Allocator (NodeRef -> bytes)            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Nodes never hold pointers. Every handle is a `Copy` wrapper around a
//! [`NodeRef`], and every operation borrows the allocator for its duration:
//! `&A` for reads and `&mut A` for writes. The borrow checker therefore
//! rejects holding a value slice across a mutation.
//!
//! ## Module Overview
//!
//! - [`config`]: layout constants and [`ColumnConfig`]
//! - [`storage`]: [`Allocator`] trait and the in-memory [`SlabAllocator`]
//! - [`node`]: serialized node formats
//! - [`tree`]: positional B+tree engine over the [`tree::TreeLeaf`] trait
//! - [`column`]: [`StringColumn`], [`IntColumn`], auto-enumeration,
//!   diagnostics
//! - [`index`]: [`StringIndex`] and its update protocol
//!
//! ## Logging
//!
//! Structural events (promotion, splits, root changes, index maintenance) are
//! emitted through `tracing` at `debug` and `trace` level. The library never
//! installs a subscriber.

#[macro_use]
mod macros;

pub mod column;
pub mod config;
pub mod index;
pub mod node;
pub mod storage;
pub mod tree;

pub use column::{AutoEnumeration, IntColumn, StringColumn, StringLeaf};
pub use config::ColumnConfig;
pub use index::{StringIndex, ValueSource};
pub use node::{NodeType, ParentLink};
pub use storage::{Allocator, NodeRef, SlabAllocator};
