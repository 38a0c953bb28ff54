//! # Storage Module
//!
//! Column nodes never hold pointers. Every node is an opaque [`NodeRef`] that
//! only an [`Allocator`] can resolve into bytes, so the same column code runs
//! over any backing store that implements the trait.
//!
//! ## Allocator Contract
//!
//! ```text
//! alloc(size)          -> NodeRef      zero-filled buffer
//! translate(ref)       -> &[u8]        shared view, borrows the allocator
//! translate_mut(ref)   -> &mut [u8]    exclusive view
//! resize(ref, size)                    reference stays stable
//! free(ref)
//! ```
//!
//! Because `translate` borrows the allocator immutably and every mutation
//! requires `&mut`, the borrow checker rejects holding a node view across a
//! call that could reallocate it.
//!
//! ## Module Organization
//!
//! - `allocator`: the [`Allocator`] trait and [`NodeRef`]
//! - `freelist`: reusable slot tracking
//! - `slab`: [`SlabAllocator`], the in-memory implementation
//!
//! ## Thread Safety
//!
//! Allocators are used through `&mut` for writes and are not shared across
//! threads by the column layer.

mod allocator;
mod freelist;
mod slab;

pub use allocator::{Allocator, NodeRef};
pub use freelist::Freelist;
pub use slab::SlabAllocator;
