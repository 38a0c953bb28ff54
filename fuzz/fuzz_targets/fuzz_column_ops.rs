//! Fuzz testing for string column mutations.
//!
//! Applies an arbitrary sequence of operations to a `StringColumn` with a
//! small leaf capacity and to a `Vec<String>` model, then checks that both
//! agree and that the column (and its index, when attached) verifies.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use turcol::{ColumnConfig, SlabAllocator, StringColumn};

#[derive(Debug, Arbitrary)]
struct ColumnInput {
    capacity: u8,
    indexed: bool,
    operations: Vec<ColumnOperation>,
}

#[derive(Debug, Arbitrary)]
enum ColumnOperation {
    Add(String),
    Insert(u16, String),
    Set(u16, String),
    Delete(u16),
    Find(String),
    Clear,
    AutoEnumerate,
}

fn clean(value: &str) -> String {
    value.chars().filter(|&c| c != '\0').take(64).collect()
}

fuzz_target!(|input: ColumnInput| {
    if input.operations.len() > 500 {
        return;
    }

    let capacity = 2 + (input.capacity as usize % 8);
    let config = match ColumnConfig::builder().leaf_capacity(capacity).build() {
        Ok(config) => config,
        Err(_) => return,
    };

    let mut alloc = SlabAllocator::new();
    let mut column = StringColumn::with_config(&mut alloc, config).unwrap();
    if input.indexed {
        column.create_index(&mut alloc).unwrap();
    }
    let mut model: Vec<String> = Vec::new();

    for op in &input.operations {
        match op {
            ColumnOperation::Add(v) => {
                let v = clean(v);
                column.add(&mut alloc, &v).unwrap();
                model.push(v);
            }
            ColumnOperation::Insert(row, v) => {
                let v = clean(v);
                let row = *row as usize % (model.len() + 1);
                column.insert(&mut alloc, row, &v).unwrap();
                model.insert(row, v);
            }
            ColumnOperation::Set(row, v) => {
                if model.is_empty() {
                    continue;
                }
                let v = clean(v);
                let row = *row as usize % model.len();
                column.set(&mut alloc, row, &v).unwrap();
                model[row] = v;
            }
            ColumnOperation::Delete(row) => {
                if model.is_empty() {
                    assert!(column.delete(&mut alloc, 0).is_err());
                    continue;
                }
                let row = *row as usize % model.len();
                column.delete(&mut alloc, row).unwrap();
                model.remove(row);
            }
            ColumnOperation::Find(v) => {
                let v = clean(v);
                let expected: Vec<usize> = model
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| **m == v)
                    .map(|(row, _)| row)
                    .collect();
                assert_eq!(column.find_all(&alloc, &v).unwrap(), expected);
                assert_eq!(column.find_first(&alloc, &v).unwrap(), expected.first().copied());
                assert_eq!(column.count(&alloc, &v).unwrap(), expected.len());
            }
            ColumnOperation::Clear => {
                column.clear(&mut alloc).unwrap();
                model.clear();
            }
            ColumnOperation::AutoEnumerate => {
                let mut distinct = model.clone();
                distinct.sort();
                distinct.dedup();
                let result = column.auto_enumerate(&mut alloc).unwrap();
                assert_eq!(result.is_some(), 2 * distinct.len() <= model.len());
                if let Some(result) = result {
                    let keys = StringColumn::from_ref(&alloc, result.keys, config).unwrap();
                    keys.destroy(&mut alloc).unwrap();
                    let values = turcol::IntColumn::from_ref(&alloc, result.values, config).unwrap();
                    values.destroy(&mut alloc).unwrap();
                }
            }
        }

        assert_eq!(column.size(&alloc).unwrap(), model.len());
        column.verify(&alloc).unwrap();
    }

    for (row, value) in model.iter().enumerate() {
        assert_eq!(column.get(&alloc, row).unwrap(), value);
    }
    column.destroy(&mut alloc).unwrap();
    assert_eq!(alloc.live_nodes(), 0);
});
