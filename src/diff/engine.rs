//! Lockstep diff of two state trees

use super::log::{DiffAction, DiffEntry, DiffLog};
use crate::model::{Hash256, InnerNode, TreeNode, BRANCH_FACTOR, MAX_TREE_DEPTH};
use crate::store::NodeStore;
use crate::{Error, Result};
use tracing::{debug, trace};

/// Pending expansion of an inner node whose own entry is already logged
enum Frame {
    /// Both sides are inner nodes with different hashes
    Pair {
        old: InnerNode,
        new: InnerNode,
        depth: usize,
    },
    /// Subtree exists only on the old side
    Removed { node: InnerNode, depth: usize },
    /// Subtree exists only on the new side
    Added { node: InnerNode, depth: usize },
}

/// Walks two trees from their roots and logs every changed path
///
/// Identical hashes are never descended into, so the cost follows the number
/// of changed paths rather than the size of the trees. Expanding a frame logs
/// the entries for all of its differing slots in slot order, then schedules
/// their own expansions ahead of any sibling frame. An explicit stack keeps
/// the walk iterative; `max_depth` bounds it against corrupted stores.
pub struct DiffEngine<'a> {
    store: &'a dyn NodeStore,
    max_depth: usize,
    lookups: usize,
}

impl<'a> DiffEngine<'a> {
    pub fn new(store: &'a dyn NodeStore) -> Self {
        DiffEngine {
            store,
            max_depth: MAX_TREE_DEPTH,
            lookups: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Diff `old_root` against `new_root`.
    ///
    /// Any failed lookup aborts the whole diff; no partial log is returned.
    pub fn diff(&mut self, old_root: Hash256, new_root: Hash256) -> Result<DiffLog> {
        let mut log = DiffLog::new();
        if old_root == new_root {
            return Ok(log);
        }

        self.lookups = 0;
        let old = self.fetch(&old_root)?;
        let new = self.fetch(&new_root)?;

        let mut stack: Vec<Frame> = Vec::new();
        let mut pending: Vec<Frame> = Vec::new();

        self.diverge(old_root, old, new_root, new, 0, &mut log, &mut pending)?;
        stack.extend(pending.drain(..).rev());

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Pair { old, new, depth } => {
                    for slot in 0..BRANCH_FACTOR {
                        match (old.child(slot), new.child(slot)) {
                            (None, None) => {}
                            (Some(a), Some(b)) if a == b => {}
                            (Some(a), Some(b)) => {
                                let old_child = self.fetch(&a)?;
                                let new_child = self.fetch(&b)?;
                                self.diverge(
                                    a,
                                    old_child,
                                    b,
                                    new_child,
                                    depth + 1,
                                    &mut log,
                                    &mut pending,
                                )?;
                            }
                            (Some(a), None) => {
                                let child = self.fetch(&a)?;
                                self.one_sided(
                                    DiffAction::Delete,
                                    a,
                                    child,
                                    depth + 1,
                                    &mut log,
                                    &mut pending,
                                )?;
                            }
                            (None, Some(b)) => {
                                let child = self.fetch(&b)?;
                                self.one_sided(
                                    DiffAction::Add,
                                    b,
                                    child,
                                    depth + 1,
                                    &mut log,
                                    &mut pending,
                                )?;
                            }
                        }
                    }
                }
                Frame::Removed { node, depth } => {
                    for (_, hash) in node.occupied() {
                        let child = self.fetch(&hash)?;
                        self.one_sided(
                            DiffAction::Delete,
                            hash,
                            child,
                            depth + 1,
                            &mut log,
                            &mut pending,
                        )?;
                    }
                }
                Frame::Added { node, depth } => {
                    for (_, hash) in node.occupied() {
                        let child = self.fetch(&hash)?;
                        self.one_sided(
                            DiffAction::Add,
                            hash,
                            child,
                            depth + 1,
                            &mut log,
                            &mut pending,
                        )?;
                    }
                }
            }
            stack.extend(pending.drain(..).rev());
        }

        debug!(
            old = %old_root.short(),
            new = %new_root.short(),
            entries = log.len(),
            lookups = self.lookups,
            "diff complete"
        );
        Ok(log)
    }

    fn fetch(&mut self, hash: &Hash256) -> Result<TreeNode> {
        self.lookups += 1;
        trace!(hash = %hash.short(), "lookup");
        let node = self.store.get(hash)?;
        node.check_kind()?;
        Ok(node)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Log a node present on both sides with different hashes, Delete first
    #[allow(clippy::too_many_arguments)]
    fn diverge(
        &self,
        old_hash: Hash256,
        old: TreeNode,
        new_hash: Hash256,
        new: TreeNode,
        depth: usize,
        log: &mut DiffLog,
        pending: &mut Vec<Frame>,
    ) -> Result<()> {
        self.check_depth(depth)?;
        log.push(DiffEntry::new(DiffAction::Delete, &old, old_hash, depth));
        log.push(DiffEntry::new(DiffAction::Add, &new, new_hash, depth));

        match (old, new) {
            (TreeNode::Inner(old), TreeNode::Inner(new)) => {
                pending.push(Frame::Pair { old, new, depth });
            }
            (TreeNode::Inner(node), TreeNode::Leaf(_)) => {
                pending.push(Frame::Removed { node, depth });
            }
            (TreeNode::Leaf(_), TreeNode::Inner(node)) => {
                pending.push(Frame::Added { node, depth });
            }
            (TreeNode::Leaf(_), TreeNode::Leaf(_)) => {}
        }
        Ok(())
    }

    /// Log a node present on one side only
    fn one_sided(
        &self,
        action: DiffAction,
        hash: Hash256,
        node: TreeNode,
        depth: usize,
        log: &mut DiffLog,
        pending: &mut Vec<Frame>,
    ) -> Result<()> {
        self.check_depth(depth)?;
        log.push(DiffEntry::new(action, &node, hash, depth));

        if let TreeNode::Inner(node) = node {
            pending.push(match action {
                DiffAction::Delete => Frame::Removed { node, depth },
                DiffAction::Add => Frame::Added { node, depth },
            });
        }
        Ok(())
    }
}

/// Diff two state trees read from `store`
pub fn diff(old_root: Hash256, new_root: Hash256, store: &dyn NodeStore) -> Result<DiffLog> {
    DiffEngine::new(store).diff(old_root, new_root)
}
