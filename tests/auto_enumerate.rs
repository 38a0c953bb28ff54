//! # Auto-Enumerate Properties
//!
//! For a column of n rows with k distinct values, auto-enumeration succeeds
//! iff k <= n/2. On success the keys are strictly sorted and
//! `keys[values[i]] == column[i]` for every row.

use turcol::{ColumnConfig, IntColumn, SlabAllocator, StringColumn};

fn build(alloc: &mut SlabAllocator, capacity: usize, values: &[String]) -> StringColumn {
    let config = ColumnConfig::builder().leaf_capacity(capacity).build().unwrap();
    let mut column = StringColumn::with_config(alloc, config).unwrap();
    for value in values {
        column.add(alloc, value).unwrap();
    }
    column
}

fn check_enumeration(rows: usize, distinct: usize, capacity: usize) {
    let mut alloc = SlabAllocator::new();
    let values: Vec<String> = (0..rows)
        .map(|row| {
            let key = (row * 7 + 3) % distinct;
            if key % 3 == 0 {
                format!("key number {key:03} with a long tail")
            } else {
                format!("k{key:03}")
            }
        })
        .collect();
    let column = build(&mut alloc, capacity, &values);

    let result = column.auto_enumerate(&mut alloc).unwrap();
    if 2 * distinct > rows {
        assert!(result.is_none(), "n={rows} k={distinct} should decline");
        return;
    }
    let result = result.unwrap_or_else(|| panic!("n={rows} k={distinct} should succeed"));

    let keys = StringColumn::from_ref(&alloc, result.keys, column.config()).unwrap();
    let positions = IntColumn::from_ref(&alloc, result.values, column.config()).unwrap();
    assert_eq!(keys.size(&alloc).unwrap(), distinct);
    assert_eq!(positions.size(&alloc).unwrap(), rows);

    for pos in 1..distinct {
        assert!(keys.get(&alloc, pos - 1).unwrap() < keys.get(&alloc, pos).unwrap());
    }
    for (row, value) in values.iter().enumerate() {
        let key = positions.get(&alloc, row).unwrap() as usize;
        assert_eq!(keys.get(&alloc, key).unwrap(), value);
    }
}

#[test]
fn succeeds_iff_at_most_half_distinct() {
    for (rows, distinct) in [(10, 1), (10, 4), (10, 5), (10, 6), (11, 5), (11, 6), (2, 1), (3, 2)] {
        check_enumeration(rows, distinct, 1000);
    }
}

#[test]
fn works_over_tree_shaped_columns() {
    check_enumeration(60, 12, 4);
    check_enumeration(60, 31, 4);
}

#[test]
fn declining_frees_temporary_keys() {
    let mut alloc = SlabAllocator::new();
    let values: Vec<String> = (0..20).map(|row| format!("unique value {row}")).collect();
    let column = build(&mut alloc, 3, &values);
    let before = alloc.live_nodes();

    assert!(column.auto_enumerate(&mut alloc).unwrap().is_none());
    assert_eq!(alloc.live_nodes(), before);
}
