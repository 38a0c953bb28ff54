//! # Column Scenarios
//!
//! End-to-end behavior of `StringColumn` through the public API:
//!
//! - Round trips on both sides of the 16-byte threshold
//! - Promotion keeping earlier rows in place
//! - Find / count semantics with repeated values
//! - Size accounting across insert and delete sequences
//! - Contract violations reported as errors
//!
//! If any test fails after making changes, it indicates a regression.

use turcol::{ColumnConfig, NodeType, SlabAllocator, StringColumn};

const SHORT_15: &str = "fifteen bytes!!";
const LONG_20: &str = "a 20-byte-long-string";

fn column_with(alloc: &mut SlabAllocator, values: &[&str]) -> StringColumn {
    let mut column = StringColumn::new(alloc).unwrap();
    for value in values {
        column.add(alloc, value).unwrap();
    }
    column
}

fn contents(alloc: &SlabAllocator, column: &StringColumn) -> Vec<String> {
    (0..column.size(alloc).unwrap())
        .map(|row| column.get(alloc, row).unwrap().to_string())
        .collect()
}

mod round_trip {
    use super::*;

    #[test]
    fn fifteen_byte_value_stays_on_short_path() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["x", "y"]);

        column.insert(&mut alloc, 1, SHORT_15).unwrap();

        assert_eq!(SHORT_15.len(), 15);
        assert_eq!(column.get(&alloc, 1).unwrap(), SHORT_15);
        assert_eq!(column.node_type(), NodeType::ShortLeaf);
    }

    #[test]
    fn twenty_byte_value_takes_long_path() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["x", "y"]);

        column.insert(&mut alloc, 1, LONG_20).unwrap();

        assert_eq!(column.get(&alloc, 1).unwrap(), LONG_20);
        assert_eq!(column.node_type(), NodeType::LongLeaf);
    }

    #[test]
    fn empty_and_unicode_values_round_trip() {
        let mut alloc = SlabAllocator::new();
        let values = ["", "é", "日本語", "emoji 🦀 crab in a longer string"];
        let column = column_with(&mut alloc, &values);

        assert_eq!(contents(&alloc, &column), values);
    }
}

mod promotion {
    use super::*;

    #[test]
    fn insert_long_value_into_short_column() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["a", "b", "c"]);

        column.insert(&mut alloc, 1, LONG_20).unwrap();

        assert_eq!(column.node_type(), NodeType::LongLeaf);
        assert_eq!(column.get(&alloc, 0).unwrap(), "a");
        assert_eq!(column.get(&alloc, 1).unwrap(), LONG_20);
        assert_eq!(column.get(&alloc, 2).unwrap(), "b");
        assert_eq!(column.get(&alloc, 3).unwrap(), "c");
    }

    #[test]
    fn set_long_value_keeps_every_other_row() {
        let mut alloc = SlabAllocator::new();
        let shorts: Vec<String> = (0..40).map(|i| format!("s{i}")).collect();
        let refs: Vec<&str> = shorts.iter().map(String::as_str).collect();
        let mut column = column_with(&mut alloc, &refs);

        column.set(&mut alloc, 17, LONG_20).unwrap();

        for (row, value) in shorts.iter().enumerate() {
            let expected = if row == 17 { LONG_20 } else { value.as_str() };
            assert_eq!(column.get(&alloc, row).unwrap(), expected);
        }
    }

    #[test]
    fn long_leaf_never_demotes() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["a", LONG_20]);

        column.delete(&mut alloc, 1).unwrap();
        column.set(&mut alloc, 0, "b").unwrap();

        assert_eq!(column.node_type(), NodeType::LongLeaf);
        assert_eq!(contents(&alloc, &column), vec!["b"]);
    }

    #[test]
    fn promotion_releases_short_leaf_storage() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["a", "b"]);
        assert_eq!(alloc.live_nodes(), 1);

        column.add(&mut alloc, LONG_20).unwrap();

        assert_eq!(alloc.live_nodes(), 1);
    }
}

mod find {
    use super::*;

    #[test]
    fn apple_pear_apple() {
        let mut alloc = SlabAllocator::new();
        let column = column_with(&mut alloc, &["apple", "pear", "apple"]);

        assert_eq!(column.find_first(&alloc, "apple").unwrap(), Some(0));
        assert_eq!(column.find_all(&alloc, "apple").unwrap(), vec![0, 2]);
        assert_eq!(column.count(&alloc, "apple").unwrap(), 2);
        assert_eq!(column.find_first(&alloc, "plum").unwrap(), None);
    }

    #[test]
    fn find_matches_whole_values_only() {
        let mut alloc = SlabAllocator::new();
        let column = column_with(&mut alloc, &["app", "apple", "apples", LONG_20]);

        assert_eq!(column.find_all(&alloc, "apple").unwrap(), vec![1]);
        assert_eq!(column.count(&alloc, "app").unwrap(), 1);
        assert_eq!(column.find_first(&alloc, LONG_20).unwrap(), Some(3));
    }

    #[test]
    fn empty_string_is_a_searchable_value() {
        let mut alloc = SlabAllocator::new();
        let column = column_with(&mut alloc, &["", "x", ""]);

        assert_eq!(column.find_all(&alloc, "").unwrap(), vec![0, 2]);
    }

    #[test]
    fn find_across_leaves_reports_absolute_rows() {
        let mut alloc = SlabAllocator::new();
        let config = ColumnConfig::builder().leaf_capacity(3).build().unwrap();
        let mut column = StringColumn::with_config(&mut alloc, config).unwrap();
        for row in 0..25 {
            let value = if row % 5 == 0 { "hit" } else { "miss" };
            column.add(&mut alloc, value).unwrap();
        }

        assert_eq!(column.node_type(), NodeType::InnerNode);
        assert_eq!(column.find_all(&alloc, "hit").unwrap(), vec![0, 5, 10, 15, 20]);
        assert_eq!(column.find_first_in(&alloc, "hit", 6, 25).unwrap(), Some(10));
        assert_eq!(column.find_all_in(&alloc, "hit", 3, 16).unwrap(), vec![5, 10, 15]);
        assert_eq!(column.count(&alloc, "miss").unwrap(), 20);
    }
}

mod sizing {
    use super::*;

    #[test]
    fn size_tracks_net_inserts() {
        let mut alloc = SlabAllocator::new();
        let config = ColumnConfig::builder().leaf_capacity(4).build().unwrap();
        let mut column = StringColumn::with_config(&mut alloc, config).unwrap();
        let mut expected = 0usize;

        for step in 0..200usize {
            let size = column.size(&alloc).unwrap();
            if step % 3 == 2 && size > 0 {
                column.delete(&mut alloc, (step * 7) % size).unwrap();
                expected -= 1;
            } else {
                column.insert(&mut alloc, (step * 11) % (size + 1), "r").unwrap();
                expected += 1;
            }
            assert_eq!(column.size(&alloc).unwrap(), expected);
        }
        column.verify(&alloc).unwrap();
    }

    #[test]
    fn clear_then_reuse() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["a", "b"]);

        column.clear(&mut alloc).unwrap();
        assert!(column.is_empty(&alloc).unwrap());

        column.add(&mut alloc, "c").unwrap();
        assert_eq!(contents(&alloc, &column), vec!["c"]);
    }
}

mod contract {
    use super::*;

    #[test]
    fn out_of_range_row_fails_fast() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["a"]);

        let result = column.get(&alloc, 1);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of bounds"));

        assert!(column.delete(&mut alloc, 5).is_err());
        assert_eq!(contents(&alloc, &column), vec!["a"]);
    }

    #[test]
    fn nul_bytes_are_rejected() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &[]);

        let result = column.add(&mut alloc, "a\0b");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("NUL"));
        assert!(column.is_empty(&alloc).unwrap());
    }

    #[test]
    fn second_index_fails() {
        let mut alloc = SlabAllocator::new();
        let mut column = column_with(&mut alloc, &["a"]);

        column.create_index(&mut alloc).unwrap();
        assert!(column.create_index(&mut alloc).is_err());
    }
}

mod equality {
    use super::*;

    #[test]
    fn equal_across_representations() {
        let mut alloc = SlabAllocator::new();
        let short = column_with(&mut alloc, &["a", "b"]);
        let mut long = column_with(&mut alloc, &["a", LONG_20]);
        long.set(&mut alloc, 1, "b").unwrap();

        assert_eq!(long.node_type(), NodeType::LongLeaf);
        assert!(short.equals(&alloc, &long).unwrap());
        assert!(long.equals(&alloc, &short).unwrap());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let mut alloc = SlabAllocator::new();
        let lower = column_with(&mut alloc, &["abc"]);
        let upper = column_with(&mut alloc, &["ABC"]);

        assert!(!lower.equals(&alloc, &upper).unwrap());
    }
}
