//! # String Index
//!
//! Secondary index over a string column: every row number of the column,
//! kept in an [`IntColumn`] sorted by `(value bytes, row)`. Values are never
//! copied into the index. Every comparison reads the column through a
//! [`ValueSource`], so the entry for a row can only be located while the
//! column still holds the value the index was last told about.
//!
//! ```text
//! column:  0:"pear"  1:"apple"  2:"fig"  3:"apple"
//! index:   [ 1, 3, 2, 0 ]      apple(1) apple(3) fig(2) pear(0)
//! ```
//!
//! ## Update Protocol
//!
//! | column op   | index call                        | when                      |
//! |-------------|-----------------------------------|---------------------------|
//! | `set`       | `set(row, old, new)`              | before the column changes |
//! | `delete`    | `delete(row, old, is_last)`       | before the column changes |
//! | `insert`    | `insert(row, value, is_last)`     | after the column changes  |
//!
//! `is_last` marks a row at the tail of the column, where no stored row
//! numbers need to shift.
//!
//! Lookups binary search the sorted list, so `find_first`, `find_all` and
//! `count` cost `O(log n)` column reads plus the size of the result.

use std::cmp::Ordering;

use eyre::{ensure, Result};
use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::column::IntColumn;
use crate::config::ColumnConfig;
use crate::storage::{Allocator, NodeRef};

/// Read access to the values of the indexed column, by row.
pub trait ValueSource {
    fn value<'a, A: Allocator>(&'a self, alloc: &'a A, row: usize) -> Result<&'a [u8]>;
}

#[derive(Debug, Clone, Copy)]
pub struct StringIndex {
    rows: IntColumn,
}

impl StringIndex {
    pub fn create<A: Allocator>(alloc: &mut A, config: ColumnConfig) -> Result<Self> {
        Ok(Self {
            rows: IntColumn::with_config(alloc, config)?,
        })
    }

    /// Attaches a previously serialized index.
    pub fn from_ref<A: Allocator>(alloc: &A, node: NodeRef, config: ColumnConfig) -> Result<Self> {
        Ok(Self {
            rows: IntColumn::from_ref(alloc, node, config)?,
        })
    }

    pub fn node_ref(&self) -> NodeRef {
        self.rows.node_ref()
    }

    /// Number of entries.
    pub fn len<A: Allocator>(&self, alloc: &A) -> Result<usize> {
        self.rows.size(alloc)
    }

    pub fn is_empty<A: Allocator>(&self, alloc: &A) -> Result<bool> {
        self.rows.is_empty(alloc)
    }

    /// Indexes every row of a column of `size` rows, in row order.
    pub fn build<A, S>(&mut self, alloc: &mut A, source: &S, size: usize) -> Result<()>
    where
        A: Allocator,
        S: ValueSource,
    {
        let mut value = Vec::new();
        for row in 0..size {
            value.clear();
            value.extend_from_slice(source.value(alloc, row)?);
            self.insert(alloc, source, row, &value, true)?;
        }
        debug!(index = %self.node_ref(), rows = size, "built string index");
        Ok(())
    }

    fn entry_cmp<A, S>(
        &self,
        alloc: &A,
        source: &S,
        pos: usize,
        value: &[u8],
        row: usize,
    ) -> Result<Ordering>
    where
        A: Allocator,
        S: ValueSource,
    {
        let stored_row = self.rows.get(alloc, pos)? as usize;
        let stored = source.value(alloc, stored_row)?;
        Ok(stored.cmp(value).then(stored_row.cmp(&row)))
    }

    /// First position whose entry is `>= (value, row)`.
    fn lower_bound<A, S>(&self, alloc: &A, source: &S, value: &[u8], row: usize) -> Result<usize>
    where
        A: Allocator,
        S: ValueSource,
    {
        let mut low = 0;
        let mut high = self.rows.size(alloc)?;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.entry_cmp(alloc, source, mid, value, row)? == Ordering::Less {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        Ok(low)
    }

    /// Registers a row that was just inserted into the column.
    pub fn insert<A, S>(
        &mut self,
        alloc: &mut A,
        source: &S,
        row: usize,
        value: &[u8],
        is_last: bool,
    ) -> Result<()>
    where
        A: Allocator,
        S: ValueSource,
    {
        if !is_last {
            self.rows.adjust_ge(alloc, row as u64, 1)?;
        }
        let pos = self.lower_bound(alloc, source, value, row)?;
        self.rows.insert(alloc, pos, row as u64)?;
        trace!(row, pos, is_last, "index insert");
        Ok(())
    }

    fn remove_entry<A, S>(&mut self, alloc: &mut A, source: &S, row: usize, value: &[u8]) -> Result<()>
    where
        A: Allocator,
        S: ValueSource,
    {
        let pos = self.lower_bound(alloc, source, value, row)?;
        let found = pos < self.rows.size(alloc)?
            && self.entry_cmp(alloc, source, pos, value, row)? == Ordering::Equal;
        ensure!(
            found,
            "string index has no entry for row {} (index out of sync with column)",
            row
        );
        self.rows.delete(alloc, pos)?;
        trace!(row, pos, "index remove");
        Ok(())
    }

    /// Moves `row` from `old` to `new`. Must run while the column still
    /// holds `old` at `row`.
    pub fn set<A, S>(
        &mut self,
        alloc: &mut A,
        source: &S,
        row: usize,
        old: &[u8],
        new: &[u8],
    ) -> Result<()>
    where
        A: Allocator,
        S: ValueSource,
    {
        if old == new {
            return Ok(());
        }
        self.remove_entry(alloc, source, row, old)?;
        let pos = self.lower_bound(alloc, source, new, row)?;
        self.rows.insert(alloc, pos, row as u64)?;
        trace!(row, pos, "index set");
        Ok(())
    }

    /// Drops `row`. Must run while the column still holds `old` at `row`.
    pub fn delete<A, S>(
        &mut self,
        alloc: &mut A,
        source: &S,
        row: usize,
        old: &[u8],
        is_last: bool,
    ) -> Result<()>
    where
        A: Allocator,
        S: ValueSource,
    {
        self.remove_entry(alloc, source, row, old)?;
        if !is_last {
            self.rows.adjust_ge(alloc, row as u64 + 1, -1)?;
        }
        Ok(())
    }

    /// Positions `[first, last)` of the entries holding `value`.
    fn equal_range<A, S>(&self, alloc: &A, source: &S, value: &[u8]) -> Result<(usize, usize)>
    where
        A: Allocator,
        S: ValueSource,
    {
        let first = self.lower_bound(alloc, source, value, 0)?;
        let last = self.lower_bound(alloc, source, value, usize::MAX)?;
        Ok((first, last))
    }

    pub fn find_first<A, S>(&self, alloc: &A, source: &S, value: &[u8]) -> Result<Option<usize>>
    where
        A: Allocator,
        S: ValueSource,
    {
        let (first, last) = self.equal_range(alloc, source, value)?;
        if first == last {
            return Ok(None);
        }
        Ok(Some(self.rows.get(alloc, first)? as usize))
    }

    /// Every row holding `value`, ascending.
    pub fn find_all<A, S>(&self, alloc: &A, source: &S, value: &[u8]) -> Result<Vec<usize>>
    where
        A: Allocator,
        S: ValueSource,
    {
        let (first, last) = self.equal_range(alloc, source, value)?;
        let mut rows = Vec::with_capacity(last - first);
        for pos in first..last {
            rows.push(self.rows.get(alloc, pos)? as usize);
        }
        Ok(rows)
    }

    pub fn count<A, S>(&self, alloc: &A, source: &S, value: &[u8]) -> Result<usize>
    where
        A: Allocator,
        S: ValueSource,
    {
        let (first, last) = self.equal_range(alloc, source, value)?;
        Ok(last - first)
    }

    pub fn clear<A: Allocator>(&mut self, alloc: &mut A) -> Result<()> {
        self.rows.clear(alloc)
    }

    pub fn destroy<A: Allocator>(self, alloc: &mut A) -> Result<()> {
        self.rows.destroy(alloc)
    }

    /// Checks that the index holds every row of a `size`-row column exactly
    /// once, in `(value, row)` order.
    pub fn verify_entries<A, S>(&self, alloc: &A, source: &S, size: usize) -> Result<()>
    where
        A: Allocator,
        S: ValueSource,
    {
        let len = self.rows.size(alloc)?;
        ensure!(
            len == size,
            "string index holds {} entries for a column of {} rows",
            len,
            size
        );

        let mut seen = HashSet::with_capacity(len);
        let mut prev: Option<(&[u8], usize)> = None;
        for pos in 0..len {
            let row = self.rows.get(alloc, pos)? as usize;
            ensure!(row < size, "string index entry {} points past the column: row {}", pos, row);
            ensure!(seen.insert(row), "string index lists row {} twice", row);

            let value = source.value(alloc, row)?;
            if let Some((prev_value, prev_row)) = prev {
                ensure!(
                    (prev_value, prev_row) < (value, row),
                    "string index out of order at entry {} (row {} before row {})",
                    pos,
                    prev_row,
                    row
                );
            }
            prev = Some((value, row));
        }
        Ok(())
    }
}
