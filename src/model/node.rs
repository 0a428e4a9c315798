//! State tree node types

use super::{Hash256, NodeKind};
use serde::{Deserialize, Serialize};

/// Number of child slots in an inner node (one per key nibble)
pub const BRANCH_FACTOR: usize = 16;

/// Deepest possible node: one level per nibble of a 256-bit key
pub const MAX_TREE_DEPTH: usize = 64;

const INNER_PREFIX: &[u8] = b"MIN\0";
const LEAF_PREFIX: &[u8] = b"MLN\0";

/// A node in the state tree
///
/// Depth is not stored here; traversals compute it as the number of inner
/// hops from the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeNode {
    Inner(InnerNode),
    Leaf(LeafNode),
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Inner(_) => NodeKind::Inner,
            TreeNode::Leaf(leaf) => leaf.kind,
        }
    }

    pub fn as_inner(&self) -> Option<&InnerNode> {
        match self {
            TreeNode::Inner(inner) => Some(inner),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            TreeNode::Leaf(leaf) => Some(leaf),
            TreeNode::Inner(_) => None,
        }
    }

    /// Content identity of a leaf, independent of the node hash
    pub fn identity(&self) -> Option<Hash256> {
        self.as_leaf().map(LeafNode::identity)
    }

    /// Fails with [`crate::Error::Corruption`] for a leaf tagged with the
    /// inner kind, which no counting bucket or label can represent.
    pub fn check_kind(&self) -> crate::Result<()> {
        match self {
            TreeNode::Leaf(leaf) if leaf.kind.is_inner() => Err(crate::Error::Corruption(
                format!("Leaf {} carries the inner node kind", leaf.index),
            )),
            _ => Ok(()),
        }
    }

    /// Compute the content hash of this node.
    ///
    /// Only the storage layer calls this; traversals trust the hashes they
    /// are given.
    pub fn compute_hash(&self) -> Hash256 {
        match self {
            TreeNode::Inner(inner) => {
                let mut parts: Vec<&[u8]> = Vec::with_capacity(BRANCH_FACTOR + 1);
                parts.push(INNER_PREFIX);
                for slot in &inner.children {
                    parts.push(slot.as_ref().unwrap_or(&Hash256::ZERO).as_bytes());
                }
                Hash256::digest_many(&parts)
            }
            TreeNode::Leaf(leaf) => {
                let code = leaf.kind.entry_type().unwrap_or_default().to_be_bytes();
                Hash256::digest_many(&[LEAF_PREFIX, &code, &leaf.data, leaf.index.as_bytes()])
            }
        }
    }
}

impl From<InnerNode> for TreeNode {
    fn from(inner: InnerNode) -> Self {
        TreeNode::Inner(inner)
    }
}

impl From<LeafNode> for TreeNode {
    fn from(leaf: LeafNode) -> Self {
        TreeNode::Leaf(leaf)
    }
}

/// A branching node with positional child slots
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerNode {
    pub children: [Option<Hash256>; BRANCH_FACTOR],
}

impl InnerNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self, slot: usize) -> Option<Hash256> {
        self.children[slot]
    }

    pub fn set_child(&mut self, slot: usize, hash: Hash256) {
        self.children[slot] = Some(hash);
    }

    /// Occupied slots in slot order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, Hash256)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(slot, child)| child.map(|h| (slot, h)))
    }

    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    pub fn empty_slots(&self) -> usize {
        BRANCH_FACTOR - self.child_count()
    }
}

/// A terminal node holding one ledger object
///
/// The payload is opaque to diffing and counting; only the kind and the
/// identity (the object's ledger index) are inspected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafNode {
    pub kind: NodeKind,
    /// Ledger index of the object; also its position key in the tree
    pub index: Hash256,
    pub data: Vec<u8>,
}

impl LeafNode {
    pub fn new(kind: NodeKind, index: Hash256, data: impl Into<Vec<u8>>) -> Self {
        LeafNode {
            kind,
            index,
            data: data.into(),
        }
    }

    /// The same logical object keeps its identity wherever it sits in the
    /// tree and whatever its content.
    pub fn identity(&self) -> Hash256 {
        self.index
    }
}
