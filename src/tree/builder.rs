//! Canonical state tree construction

use crate::model::{Hash256, InnerNode, LeafNode, TreeNode, BRANCH_FACTOR};
use crate::store::NodeSink;
use crate::Result;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the radix-16 state tree for a set of ledger objects
///
/// The shape depends only on the set of indices: each leaf sits at the
/// shallowest depth where its index prefix is unique, and the root is always
/// an inner node (empty when there are no leaves). Removing a leaf therefore
/// lets its sole remaining sibling rise, and inserting one pushes a colliding
/// leaf further down.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    leaves: BTreeMap<Hash256, LeafNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_leaves(leaves: impl IntoIterator<Item = LeafNode>) -> Self {
        let mut builder = Self::new();
        for leaf in leaves {
            builder.insert(leaf);
        }
        builder
    }

    /// Insert or replace the object at `leaf.index`
    pub fn insert(&mut self, leaf: LeafNode) -> Option<LeafNode> {
        self.leaves.insert(leaf.index, leaf)
    }

    pub fn remove(&mut self, index: &Hash256) -> Option<LeafNode> {
        self.leaves.remove(index)
    }

    /// Held objects in index order
    pub fn leaves(&self) -> impl Iterator<Item = &LeafNode> + '_ {
        self.leaves.values()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Write every node into `sink` and return the root hash
    pub fn commit(&self, sink: &dyn NodeSink) -> Result<Hash256> {
        let leaves: Vec<&LeafNode> = self.leaves.values().collect();
        let root = build_inner(sink, &leaves, 0)?;
        debug!(leaves = leaves.len(), root = %root.short(), "committed state tree");
        Ok(root)
    }
}

fn build_inner(sink: &dyn NodeSink, leaves: &[&LeafNode], depth: usize) -> Result<Hash256> {
    let mut groups: [Vec<&LeafNode>; BRANCH_FACTOR] = Default::default();
    for leaf in leaves {
        groups[leaf.index.nibble(depth)].push(leaf);
    }

    let mut inner = InnerNode::new();
    for (slot, group) in groups.iter().enumerate() {
        let child = match group.as_slice() {
            [] => continue,
            [only] => sink.put(&TreeNode::Leaf((*only).clone()))?,
            many => build_inner(sink, many, depth + 1)?,
        };
        inner.set_child(slot, child);
    }

    sink.put(&TreeNode::Inner(inner))
}
