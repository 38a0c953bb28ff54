//! # Column Diagnostics
//!
//! Structural checks and a Graphviz dump for [`StringColumn`]. Neither is
//! needed for correct operation; tests and the fuzz target call `verify`
//! after every mutation.
//!
//! `verify` checks, from the root down:
//!
//! - the root is an InnerNode exactly when the column holds more rows than
//!   one leaf can
//! - every InnerNode has between 1 and `leaf_capacity` children and its
//!   cumulative offsets match the real size of each subtree
//! - every non-root leaf is non-empty and holds at most `leaf_capacity` rows
//! - every stored value is UTF-8 without NUL bytes
//! - the attached index, if any, lists each row once in `(value, row)` order

use std::fmt;

use eyre::{ensure, Result};

use super::string::{StringColumn, StringLeaf};
use crate::node::{node_type_of, InnerNode, LongLeaf, NodeType, ShortLeaf};
use crate::storage::{Allocator, NodeRef};
use crate::tree::TreeLeaf;

impl StringColumn {
    pub fn verify<A: Allocator>(&self, alloc: &A) -> Result<()> {
        let capacity = self.config().leaf_capacity();
        let size = verify_node(alloc, self.node_ref(), capacity, 0)?;

        let is_inner = self.node_type() == NodeType::InnerNode;
        ensure!(
            is_inner == (size > capacity),
            "column of {} rows has a {:?} root with leaf capacity {}",
            size,
            self.node_type(),
            capacity
        );

        if let Some(index) = &self.index {
            index.verify_entries(alloc, &self.values(), size)?;
        }
        Ok(())
    }

    /// Writes the column tree as a Graphviz digraph.
    pub fn to_dot<A: Allocator, W: fmt::Write>(&self, alloc: &A, out: &mut W) -> Result<()> {
        writeln!(out, "digraph column {{")?;
        writeln!(out, "  node [shape=record, fontname=monospace];")?;
        node_to_dot(alloc, self.node_ref(), out)?;
        if let Some(index) = &self.index {
            writeln!(
                out,
                "  index [label=\"string index|{} entries\"];",
                index.len(alloc)?
            )?;
            writeln!(out, "  index -> n{} [style=dashed];", self.node_ref().get())?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

/// Returns the row count of the subtree at `node`.
fn verify_node<A: Allocator>(alloc: &A, node: NodeRef, capacity: usize, depth: usize) -> Result<usize> {
    if node_type_of(alloc, node)? != NodeType::InnerNode {
        let leaf = StringLeaf::open(alloc, node, None)?;
        let len = leaf.len(alloc)?;
        if depth > 0 {
            ensure!(
                len > 0 && len <= capacity,
                "leaf {} holds {} rows (capacity {})",
                node,
                len,
                capacity
            );
        }
        for row in 0..len {
            let value = leaf.get(alloc, row)?;
            ensure!(
                !value.as_bytes().contains(&0),
                "leaf {} row {} holds a NUL byte",
                node,
                row
            );
        }
        return Ok(len);
    }

    let inner = InnerNode::open(alloc, node)?;
    let children = inner.children(alloc)?;
    ensure!(
        !children.is_empty() && children.len() <= capacity,
        "inner node {} has {} children (capacity {})",
        node,
        children.len(),
        capacity
    );

    let mut total = 0;
    for (ndx, (child, rows)) in children.into_iter().enumerate() {
        let actual = verify_node(alloc, child, capacity, depth + 1)?;
        ensure!(
            actual == rows,
            "inner node {} records {} rows for child {} which holds {}",
            node,
            rows,
            ndx,
            actual
        );
        total += actual;
    }
    Ok(total)
}

fn node_to_dot<A: Allocator, W: fmt::Write>(alloc: &A, node: NodeRef, out: &mut W) -> Result<()> {
    let id = node.get();
    match node_type_of(alloc, node)? {
        NodeType::InnerNode => {
            let inner = InnerNode::open(alloc, node)?;
            let children = inner.children(alloc)?;
            let mut offset = 0;
            let cells: Vec<String> = children
                .iter()
                .enumerate()
                .map(|(ndx, (_, rows))| {
                    offset += rows;
                    format!("<c{}> {}", ndx, offset)
                })
                .collect();
            writeln!(out, "  n{} [label=\"inner {}|{}\"];", id, node, cells.join("|"))?;
            for (ndx, (child, _)) in children.iter().enumerate() {
                writeln!(out, "  n{}:c{} -> n{};", id, ndx, child.get())?;
                node_to_dot(alloc, *child, out)?;
            }
        }
        NodeType::ShortLeaf => {
            let leaf = ShortLeaf::open(alloc, node)?;
            let values = (0..leaf.len(alloc)?)
                .map(|row| leaf.get(alloc, row).map(escape))
                .collect::<Result<Vec<_>>>()?;
            writeln!(
                out,
                "  n{} [label=\"short {} (width {})|{}\"];",
                id,
                node,
                leaf.width(alloc)?,
                values.join("|")
            )?;
        }
        NodeType::LongLeaf => {
            let leaf = LongLeaf::open(alloc, node)?;
            let values = (0..leaf.len(alloc)?)
                .map(|row| leaf.get(alloc, row).map(escape))
                .collect::<Result<Vec<_>>>()?;
            writeln!(out, "  n{} [label=\"long {}|{}\"];", id, node, values.join("|"))?;
        }
        NodeType::IntLeaf => {
            writeln!(out, "  n{} [label=\"int {}\"];", id, node)?;
        }
    }
    Ok(())
}

/// Record-label escaping for Graphviz.
fn escape(value: &[u8]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in String::from_utf8_lossy(value).chars() {
        if matches!(ch, '"' | '\\' | '|' | '{' | '}' | '<' | '>') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
