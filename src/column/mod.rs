//! # Columns
//!
//! Positional columns over the shared tree engine.
//!
//! - `string`: [`StringColumn`], the adaptive string column and its
//!   [`StringLeaf`] leaf handle
//! - `integer`: [`IntColumn`], used for index row lists and enumeration keys
//! - `enumerate`: sorted key search and dictionary-compression candidates
//! - `diagnostics`: structural verification and Graphviz output
//!
//! Every operation takes the allocator explicitly: `&A` to read, `&mut A`
//! to write. A column is a small handle and never owns the allocator.

mod diagnostics;
mod enumerate;
mod integer;
mod string;

pub use enumerate::AutoEnumeration;
pub use integer::IntColumn;
pub use string::{StringColumn, StringLeaf};
