//! # Node Field Accessors
//!
//! `zerocopy_accessors!` writes the getter/setter pairs for fixed-layout node
//! structs (`NodeHeader`, `InnerSlot`). Node buffers come from the allocator
//! at arbitrary alignment, so multi-byte fields are stored as unaligned
//! little-endian zerocopy wrappers and single-byte fields as plain `u8`.
//!
//! Each field is declared with its storage type:
//!
//! | Declared | Stored as | Getter returns | Setter takes |
//! |----------|-----------|----------------|--------------|
//! | `u8`     | `u8`      | `usize`        | `usize`      |
//! | `u32`    | `U32`     | `u32`          | `u32`        |
//! | `u64`    | `U64`     | `u64`          | `u64`        |
//!
//! Byte fields hold small node-local quantities (slot widths) that callers
//! index with, so they are widened to `usize` on the way out.
//!
//! ```ignore
//! #[repr(C)]
//! struct NodeHeader {
//!     node_type: u8,
//!     width: u8,
//!     reserved: [u8; 2],
//!     count: U32,
//! }
//!
//! impl NodeHeader {
//!     zerocopy_accessors! {
//!         width: u8,
//!         count: u32,
//!     }
//! }
//!
//! // header.width() -> usize, header.set_width(8)
//! // header.count() -> u32,   header.set_count(3)
//! ```

/// Generates getter and setter methods for node struct fields.
#[macro_export]
macro_rules! zerocopy_accessors {
    (@impl $field:ident, u8) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> usize {
                self.$field as usize
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: usize) {
                debug_assert!(val <= u8::MAX as usize, "{} out of range: {}", stringify!($field), val);
                self.$field = val as u8;
            }
        }
    };
    (@impl $field:ident, u32) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u32 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u32) {
                self.$field = ::zerocopy::little_endian::U32::new(val);
            }
        }
    };
    (@impl $field:ident, u64) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u64 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u64) {
                self.$field = ::zerocopy::little_endian::U64::new(val);
            }
        }
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::zerocopy_accessors!(@impl $field, $ty);
        )*
    };
}
