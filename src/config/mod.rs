//! # Column Configuration
//!
//! Fixed layout constants live in [`constants`] next to the compile-time
//! assertions that tie them together. The only tunable is the tree node
//! capacity, carried per column by [`ColumnConfig`].

pub mod constants;
pub use constants::*;

/// Per-column tree settings.
///
/// ```ignore
/// let config = ColumnConfig::builder().leaf_capacity(4).build()?;
/// let column = StringColumn::with_config(&mut alloc, config)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnConfig {
    leaf_capacity: usize,
}

impl ColumnConfig {
    pub fn builder() -> ColumnConfigBuilder {
        ColumnConfigBuilder::default()
    }

    /// Maximum number of entries in one leaf, and of children in one inner node.
    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
        }
    }
}

#[derive(Debug, Default)]
pub struct ColumnConfigBuilder {
    leaf_capacity: Option<usize>,
}

impl ColumnConfigBuilder {
    pub fn leaf_capacity(mut self, capacity: usize) -> Self {
        self.leaf_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> eyre::Result<ColumnConfig> {
        let leaf_capacity = self.leaf_capacity.unwrap_or(DEFAULT_LEAF_CAPACITY);
        eyre::ensure!(
            (MIN_LEAF_CAPACITY..=MAX_LEAF_CAPACITY).contains(&leaf_capacity),
            "leaf capacity {} outside [{}, {}]",
            leaf_capacity,
            MIN_LEAF_CAPACITY,
            MAX_LEAF_CAPACITY
        );
        Ok(ColumnConfig { leaf_capacity })
    }
}
