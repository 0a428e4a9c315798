//! Shared fixtures for integration tests

#![allow(dead_code)]

use ledger_diff::{Hash256, LeafNode, NodeKind, NodeStore, TreeNode};

/// An index whose leading nibbles are `prefix`; remaining bytes are `seed`
pub fn index(prefix: &[u8], seed: u8) -> Hash256 {
    let mut bytes = [seed; 32];
    for (i, nibble) in prefix.iter().enumerate() {
        let shift = if i % 2 == 0 { 4 } else { 0 };
        bytes[i / 2] &= !(0x0fu8 << shift);
        bytes[i / 2] |= (nibble & 0x0f) << shift;
    }
    Hash256::from_bytes(bytes)
}

pub fn object(kind: NodeKind, prefix: &[u8], seed: u8, data: &str) -> LeafNode {
    LeafNode::new(kind, index(prefix, seed), data.as_bytes().to_vec())
}

/// Hash of the child at `slot` of the inner node `parent`
pub fn child(store: &dyn NodeStore, parent: Hash256, slot: usize) -> Hash256 {
    match store.get(&parent).unwrap() {
        TreeNode::Inner(inner) => inner.child(slot).expect("slot occupied"),
        TreeNode::Leaf(_) => panic!("{} is a leaf", parent),
    }
}

/// Follow `path` of slots down from `root`
pub fn descend(store: &dyn NodeStore, root: Hash256, path: &[usize]) -> Hash256 {
    path.iter().fold(root, |hash, slot| child(store, hash, *slot))
}

pub fn leaf_hash(leaf: &LeafNode) -> Hash256 {
    TreeNode::Leaf(leaf.clone()).compute_hash()
}
