//! Full traversal of one state tree

use super::summary::Summary;
use crate::model::{Hash256, TreeNode, MAX_TREE_DEPTH};
use crate::store::NodeStore;
use crate::{Error, Result};
use tracing::debug;

/// Counts every node reachable from one state root
///
/// Built empty by [`LedgerState::from_store`]; [`LedgerState::fill`] walks
/// the tree and only then does [`LedgerState::summary`] succeed. A failed
/// fill leaves no partial counts behind.
pub struct LedgerState<'a> {
    root: Hash256,
    store: &'a dyn NodeStore,
    max_depth: usize,
    summary: Option<Summary>,
}

impl<'a> LedgerState<'a> {
    /// Bind an empty accumulator to `root`, checking that the root resolves.
    ///
    /// A store failure other than a missing root is returned unchanged.
    pub fn from_store(root: Hash256, store: &'a dyn NodeStore) -> Result<Self> {
        store.get(&root)?;
        Ok(LedgerState {
            root,
            store,
            max_depth: MAX_TREE_DEPTH,
            summary: None,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn is_filled(&self) -> bool {
        self.summary.is_some()
    }

    /// Visit every node depth-first and accumulate counts.
    ///
    /// A subtree reachable along two paths is counted once per path.
    pub fn fill(&mut self) -> Result<()> {
        self.summary = None;

        let mut summary = Summary::default();
        let mut stack = vec![(self.root, 0usize)];

        while let Some((hash, depth)) = stack.pop() {
            if depth > self.max_depth {
                return Err(Error::DepthExceeded {
                    depth,
                    limit: self.max_depth,
                });
            }

            let node = self.store.get(&hash)?;
            summary.max_depth = summary.max_depth.max(depth as u64);

            match &node {
                TreeNode::Inner(inner) => {
                    summary.inner_nodes += 1;
                    summary.empty_slots += inner.empty_slots() as u64;
                    let children: Vec<Hash256> = inner.occupied().map(|(_, h)| h).collect();
                    stack.extend(children.into_iter().rev().map(|h| (h, depth + 1)));
                }
                TreeNode::Leaf(leaf) => {
                    let i = leaf.kind.leaf_index().ok_or_else(|| {
                        Error::Corruption(format!("Leaf {} carries the inner node kind", hash))
                    })?;
                    summary.leaf_nodes += 1;
                    summary.kind_counts[i] += 1;
                }
            }
        }

        debug!(
            root = %self.root.short(),
            nodes = summary.total_nodes(),
            max_depth = summary.max_depth,
            "fill complete"
        );
        self.summary = Some(summary);
        Ok(())
    }

    /// Typed counts; fails until a fill has succeeded
    pub fn counts(&self) -> Result<&Summary> {
        self.summary.as_ref().ok_or(Error::PrematureSummary)
    }

    /// The rendered summary line
    pub fn summary(&self) -> Result<String> {
        Ok(self.counts()?.to_string())
    }
}
