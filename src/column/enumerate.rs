//! # Auto-Enumeration
//!
//! Decides whether a string column is worth dictionary-compressing and, if
//! so, produces the two structures a compressed column is made of:
//!
//! ```text
//! column:  ["b", "a", "b", "b", "a", "c"]
//!
//! keys:    ["a", "b", "c"]          sorted distinct values (StringColumn)
//! values:  [ 1,   0,   1,   1,   0,   2 ]   key position per row (IntColumn)
//! ```
//!
//! The scan collects keys into a sorted temporary column and gives up as
//! soon as admitting one more distinct key would make the keys more than
//! half the rows. The source column is never modified.

use std::cmp::Ordering;

use eyre::Result;
use tracing::debug;

use super::integer::IntColumn;
use super::string::StringColumn;
use crate::storage::{Allocator, NodeRef};

/// Serialized result of a successful auto-enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoEnumeration {
    pub keys: NodeRef,
    pub values: NodeRef,
}

impl StringColumn {
    /// Binary search over a column whose rows are sorted byte-wise.
    ///
    /// Returns the first position holding a value `>= target` and whether
    /// that position holds `target` exactly. Meaningless on an unsorted
    /// column.
    pub fn find_key_pos<A: Allocator>(&self, alloc: &A, target: &str) -> Result<(usize, bool)> {
        let size = self.size(alloc)?;
        let mut low = 0;
        let mut high = size;

        while low < high {
            let mid = low + (high - low) / 2;
            match self.get(alloc, mid)?.as_bytes().cmp(target.as_bytes()) {
                Ordering::Less => low = mid + 1,
                _ => high = mid,
            }
        }

        let found = low < size && self.get(alloc, low)? == target;
        Ok((low, found))
    }

    /// Builds a sorted key list and a per-row key position list, or returns
    /// `None` when the column has too few repeated values.
    pub fn auto_enumerate<A: Allocator>(&self, alloc: &mut A) -> Result<Option<AutoEnumeration>> {
        let size = self.size(alloc)?;
        let mut keys = StringColumn::with_config(alloc, self.config())?;

        for row in 0..size {
            let value = self.get(alloc, row)?.to_owned();
            let (pos, found) = keys.find_key_pos(alloc, &value)?;
            if found {
                continue;
            }

            let distinct = keys.size(alloc)? + 1;
            if 2 * distinct > size {
                debug!(
                    rows = size,
                    scanned = row,
                    distinct,
                    "auto-enumerate declined, too few duplicates"
                );
                keys.destroy(alloc)?;
                return Ok(None);
            }
            keys.insert(alloc, pos, &value)?;
        }

        let mut values = IntColumn::with_config(alloc, self.config())?;
        for row in 0..size {
            let value = self.get(alloc, row)?.to_owned();
            let (pos, _) = keys.find_key_pos(alloc, &value)?;
            values.add(alloc, pos as u64)?;
        }

        let result = AutoEnumeration {
            keys: keys.node_ref(),
            values: values.node_ref(),
        };
        debug!(
            rows = size,
            distinct = keys.size(alloc)?,
            keys = %result.keys,
            values = %result.values,
            "auto-enumerated string column"
        );
        Ok(Some(result))
    }
}
