//! # Freelist Management
//!
//! Tracks allocator slots released by `free` so that later allocations reuse
//! them before the slot table grows. Columns churn nodes constantly (leaf
//! promotion, splits, collapse, clear), so without reuse the slot table would
//! only ever grow.
//!
//! ## Allocation Strategy
//!
//! ```text
//! release(slot): push onto the stack
//! acquire():     pop the most recently released slot, or None
//! ```
//!

#[derive(Debug, Default)]
pub struct Freelist {
    slots: Vec<usize>,
}

impl Freelist {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn acquire(&mut self) -> Option<usize> {
        self.slots.pop()
    }

    pub fn release(&mut self, slot: usize) {
        self.slots.push(slot);
    }

    pub fn free_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
