//! # Tree Shapes
//!
//! Columns with a tiny leaf capacity so a handful of rows exercises root
//! growth, multi-level splits, per-leaf promotion under inner nodes, and
//! collapse back to a single leaf.

use turcol::node::InnerNode;
use turcol::{ColumnConfig, NodeType, ParentLink, SlabAllocator, StringColumn};

const LONG: &str = "long enough to need a long leaf";

fn small(alloc: &mut SlabAllocator, capacity: usize) -> StringColumn {
    let config = ColumnConfig::builder().leaf_capacity(capacity).build().unwrap();
    StringColumn::with_config(alloc, config).unwrap()
}

fn contents(alloc: &SlabAllocator, column: &StringColumn) -> Vec<String> {
    (0..column.size(alloc).unwrap())
        .map(|row| column.get(alloc, row).unwrap().to_string())
        .collect()
}

#[test]
fn root_grows_past_leaf_capacity() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 4);

    for row in 0..4 {
        column.add(&mut alloc, &row.to_string()).unwrap();
    }
    assert_eq!(column.node_type(), NodeType::ShortLeaf);

    column.add(&mut alloc, "4").unwrap();
    assert_eq!(column.node_type(), NodeType::InnerNode);
    assert_eq!(contents(&alloc, &column), vec!["0", "1", "2", "3", "4"]);
    column.verify(&alloc).unwrap();
}

#[test]
fn many_levels_keep_order() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    let mut model: Vec<String> = Vec::new();

    for i in 0..150usize {
        let row = (i * 37) % (model.len() + 1);
        let value = format!("v{i}");
        column.insert(&mut alloc, row, &value).unwrap();
        model.insert(row, value);
    }

    assert_eq!(contents(&alloc, &column), model);
    column.verify(&alloc).unwrap();
}

#[test]
fn leaves_promote_independently() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    for row in 0..9 {
        column.add(&mut alloc, &format!("r{row}")).unwrap();
    }

    column.set(&mut alloc, 7, LONG).unwrap();
    column.insert(&mut alloc, 1, LONG).unwrap();

    let mut dot = String::new();
    column.to_dot(&alloc, &mut dot).unwrap();
    assert!(dot.contains("long #"));
    assert!(dot.contains("short #"));

    assert_eq!(column.get(&alloc, 1).unwrap(), LONG);
    assert_eq!(column.get(&alloc, 8).unwrap(), LONG);
    assert_eq!(column.get(&alloc, 9).unwrap(), "r8");
    column.verify(&alloc).unwrap();
}

#[test]
fn deletes_collapse_to_single_leaf() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    for row in 0..12 {
        column.add(&mut alloc, &format!("r{row}")).unwrap();
    }
    column.set(&mut alloc, 11, LONG).unwrap();

    while column.size(&alloc).unwrap() > 3 {
        column.delete(&mut alloc, 0).unwrap();
        column.verify(&alloc).unwrap();
    }

    assert_eq!(column.node_type(), NodeType::LongLeaf);
    assert_eq!(contents(&alloc, &column), vec!["r9", "r10", LONG]);
    assert_eq!(alloc.live_nodes(), 1);
}

#[test]
fn collapse_of_short_leaves_stays_short() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    for row in 0..5 {
        column.add(&mut alloc, &format!("r{row}")).unwrap();
    }

    column.delete(&mut alloc, 4).unwrap();
    column.delete(&mut alloc, 0).unwrap();

    assert_eq!(column.node_type(), NodeType::ShortLeaf);
    assert_eq!(contents(&alloc, &column), vec!["r1", "r2", "r3"]);
}

#[test]
fn collapse_keeps_long_encoding_without_long_values() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    for value in [LONG, "a", "b"] {
        column.add(&mut alloc, value).unwrap();
    }
    assert_eq!(column.node_type(), NodeType::LongLeaf);
    column.add(&mut alloc, "c").unwrap();
    assert_eq!(column.node_type(), NodeType::InnerNode);

    column.set(&mut alloc, 0, "x").unwrap();
    column.delete(&mut alloc, 3).unwrap();

    assert_eq!(column.node_type(), NodeType::LongLeaf);
    assert_eq!(contents(&alloc, &column), vec!["x", "a", "b"]);
    column.verify(&alloc).unwrap();
    assert_eq!(alloc.live_nodes(), 1);
}

#[test]
fn parent_slot_follows_root_changes() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    let holder = InnerNode::create(&mut alloc, &[(column.node_ref(), 0)]).unwrap();
    column.set_parent(Some(ParentLink::new(holder.node_ref(), 0)));

    column.add(&mut alloc, LONG).unwrap();
    assert_eq!(holder.child(&alloc, 0).unwrap(), column.node_ref());

    for row in 0..5 {
        column.add(&mut alloc, &format!("r{row}")).unwrap();
    }
    assert_eq!(column.node_type(), NodeType::InnerNode);
    assert_eq!(holder.child(&alloc, 0).unwrap(), column.node_ref());

    column.clear(&mut alloc).unwrap();
    assert_eq!(column.node_type(), NodeType::ShortLeaf);
    assert_eq!(holder.child(&alloc, 0).unwrap(), column.node_ref());
}

#[test]
fn fill_builds_tree_of_empty_strings() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 4);

    column.fill(&mut alloc, 30).unwrap();

    assert_eq!(column.node_type(), NodeType::InnerNode);
    assert_eq!(column.count(&alloc, "").unwrap(), 30);
    column.verify(&alloc).unwrap();
}

#[test]
fn destroy_releases_every_node() {
    let mut alloc = SlabAllocator::new();
    let mut column = small(&mut alloc, 3);
    for row in 0..40 {
        let value = if row % 7 == 0 { LONG.to_string() } else { format!("r{row}") };
        column.add(&mut alloc, &value).unwrap();
    }
    column.create_index(&mut alloc).unwrap();
    assert!(alloc.live_nodes() > 10);

    column.destroy(&mut alloc).unwrap();

    assert_eq!(alloc.live_nodes(), 0);
    assert_eq!(alloc.allocated_bytes(), 0);
}
