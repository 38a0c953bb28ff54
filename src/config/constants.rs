//! # Column Layout Constants
//!
//! All numeric layout values are defined here. Values that depend on each
//! other are co-located and checked by compile-time assertions.
//!
//! ## Dependency Graph
//!
//! ```text
//! SHORT_STRING_LIMIT (16)
//!       │
//!       └─> SHORT_SLOT_WIDTHS (max width == SHORT_STRING_LIMIT)
//!             A short slot stores the bytes, zero padding, and one trailing
//!             byte holding the padding length. A 16-byte slot therefore
//!             holds at most 15 bytes of payload.
//!
//! DEFAULT_LEAF_CAPACITY (1000)
//!       │
//!       └─> must lie in [MIN_LEAF_CAPACITY, MAX_LEAF_CAPACITY]
//!             Splitting a full leaf needs at least two entries, and the
//!             node header stores counts as u32.
//! ```

// ============================================================================
// NODE HEADER
// ============================================================================

/// Size of the header that starts every node buffer.
pub const NODE_HEADER_SIZE: usize = 8;

// ============================================================================
// SHORT / LONG LEAF REPRESENTATION
// ============================================================================

/// Strings of this many bytes or more cannot live in a short leaf.
/// This is a property of the short-leaf encoding, not a tuning knob.
pub const SHORT_STRING_LIMIT: usize = 16;

/// Slot widths a short leaf moves through as longer values arrive.
/// Width 0 means every stored value is empty.
pub const SHORT_SLOT_WIDTHS: [usize; 4] = [0, 4, 8, 16];

/// Size of one end-offset entry in a long leaf.
pub const LONG_OFFSET_SIZE: usize = 4;

const _: () = assert!(
    SHORT_SLOT_WIDTHS[SHORT_SLOT_WIDTHS.len() - 1] == SHORT_STRING_LIMIT,
    "widest short slot must equal SHORT_STRING_LIMIT"
);

const _: () = assert!(
    SHORT_STRING_LIMIT <= u8::MAX as usize,
    "short slot padding byte must be able to hold the slot width"
);

// ============================================================================
// TREE SHAPE
// ============================================================================

/// Default maximum number of entries in a leaf (and children in an inner node).
pub const DEFAULT_LEAF_CAPACITY: usize = 1000;

/// Smallest leaf capacity that still allows a split.
pub const MIN_LEAF_CAPACITY: usize = 2;

/// Largest leaf capacity the u32 node count can express.
pub const MAX_LEAF_CAPACITY: usize = u32::MAX as usize;

/// Size of one (child, cumulative offset) pair in an inner node.
pub const INNER_SLOT_SIZE: usize = 16;

/// Size of one integer slot in an integer leaf.
pub const INT_SLOT_SIZE: usize = 8;

/// Inline depth of the descent path stack; deeper trees spill to the heap.
pub const MAX_TREE_DEPTH: usize = 8;

const _: () = assert!(
    MIN_LEAF_CAPACITY <= DEFAULT_LEAF_CAPACITY && DEFAULT_LEAF_CAPACITY <= MAX_LEAF_CAPACITY,
    "DEFAULT_LEAF_CAPACITY must lie in [MIN_LEAF_CAPACITY, MAX_LEAF_CAPACITY]"
);
