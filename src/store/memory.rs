//! In-memory node store

use super::{NodeSink, NodeStore};
use crate::model::{Hash256, TreeNode};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// HashMap-backed store for tests and embedding
///
/// Nodes are cloned out on read.
#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<Hash256, TreeNode>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node under its computed hash
    pub fn insert(&self, node: TreeNode) -> Hash256 {
        let hash = node.compute_hash();
        self.nodes.write().entry(hash).or_insert(node);
        hash
    }

    /// Store a node under an arbitrary hash, bypassing hashing
    pub fn insert_raw(&self, hash: Hash256, node: TreeNode) {
        self.nodes.write().insert(hash, node);
    }

    pub fn remove(&self, hash: &Hash256) -> Option<TreeNode> {
        self.nodes.write().remove(hash)
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

impl NodeStore for MemoryStore {
    fn get(&self, hash: &Hash256) -> Result<TreeNode> {
        self.nodes
            .read()
            .get(hash)
            .cloned()
            .ok_or(Error::NotFound(*hash))
    }

    fn contains(&self, hash: &Hash256) -> bool {
        self.nodes.read().contains_key(hash)
    }
}

impl NodeSink for MemoryStore {
    fn put(&self, node: &TreeNode) -> Result<Hash256> {
        Ok(self.insert(node.clone()))
    }
}
