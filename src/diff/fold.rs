//! Removal of shape-only relocations from a raw diff

use super::log::{DiffEntry, DiffLog};
use crate::model::{Hash256, NodeKind};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

type RelocationKey = (NodeKind, Hash256, Hash256);

fn relocation_key(entry: &DiffEntry) -> Option<RelocationKey> {
    entry.key.map(|key| (entry.kind, key, entry.hash))
}

/// Collapse leaves that only moved within the tree.
///
/// An insertion or deletion next to a leaf can push it down or pull it up a
/// level without touching its content. The raw diff then shows a Delete and
/// an Add of the same object with the same hash at different depths. Each
/// Delete, in log order, is paired with the first unmatched Add of the same
/// kind, identity and hash; both are dropped. Entries that share an identity
/// but not a hash are real content changes and stay. All remaining entries
/// keep their relative order, so a log without relocations comes back
/// unchanged.
pub fn fold(log: &DiffLog) -> DiffLog {
    let mut adds: HashMap<RelocationKey, VecDeque<usize>> = HashMap::new();
    for (i, entry) in log.iter().enumerate() {
        if entry.is_add() {
            if let Some(key) = relocation_key(entry) {
                adds.entry(key).or_default().push_back(i);
            }
        }
    }

    let mut dropped = vec![false; log.len()];
    let mut relocations = 0usize;
    for (i, entry) in log.iter().enumerate() {
        if !entry.is_delete() {
            continue;
        }
        let matched = relocation_key(entry)
            .and_then(|key| adds.get_mut(&key))
            .and_then(VecDeque::pop_front);
        if let Some(add) = matched {
            dropped[i] = true;
            dropped[add] = true;
            relocations += 1;
        }
    }

    if relocations > 0 {
        debug!(relocations, "folded relocated leaves");
    }

    log.iter()
        .zip(dropped)
        .filter(|(_, dropped)| !dropped)
        .map(|(entry, _)| entry.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::log::DiffAction;
    use crate::model::{InnerNode, LeafNode, TreeNode};

    fn leaf_entry(action: DiffAction, seed: &[u8], data: &[u8], depth: usize) -> DiffEntry {
        let node: TreeNode =
            LeafNode::new(NodeKind::AccountRoot, Hash256::digest(seed), data.to_vec()).into();
        DiffEntry::new(action, &node, node.compute_hash(), depth)
    }

    fn inner_entry(action: DiffAction, seed: &[u8], depth: usize) -> DiffEntry {
        let node: TreeNode = InnerNode::new().into();
        DiffEntry::new(action, &node, Hash256::digest(seed), depth)
    }

    #[test]
    fn test_relocated_leaf_is_dropped() {
        let log: DiffLog = vec![
            leaf_entry(DiffAction::Delete, b"acct", b"same", 3),
            inner_entry(DiffAction::Add, b"new-inner", 3),
            leaf_entry(DiffAction::Add, b"line", b"trust", 4),
            leaf_entry(DiffAction::Add, b"acct", b"same", 4),
        ]
        .into_iter()
        .collect();

        let folded = fold(&log);
        assert_eq!(folded.len(), 2);
        assert_eq!(folded.entries()[0], log.entries()[1]);
        assert_eq!(folded.entries()[1], log.entries()[2]);
    }

    #[test]
    fn test_content_change_is_kept() {
        let log: DiffLog = vec![
            inner_entry(DiffAction::Delete, b"r1", 0),
            inner_entry(DiffAction::Add, b"r2", 0),
            leaf_entry(DiffAction::Delete, b"acct", b"balance=1", 1),
            leaf_entry(DiffAction::Add, b"acct", b"balance=2", 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(fold(&log), log);
    }

    #[test]
    fn test_inner_nodes_never_fold() {
        let log: DiffLog = vec![
            inner_entry(DiffAction::Delete, b"same", 1),
            inner_entry(DiffAction::Add, b"same", 2),
        ]
        .into_iter()
        .collect();

        assert_eq!(fold(&log), log);
    }

    #[test]
    fn test_unmatched_duplicates_survive() {
        let log: DiffLog = vec![
            leaf_entry(DiffAction::Delete, b"acct", b"v", 2),
            leaf_entry(DiffAction::Delete, b"acct", b"v", 5),
            leaf_entry(DiffAction::Add, b"acct", b"v", 3),
        ]
        .into_iter()
        .collect();

        let folded = fold(&log);
        assert_eq!(folded.len(), 1);
        assert_eq!(folded.entries()[0].depth, 5);
        assert_eq!(fold(&folded), folded);
    }

    #[test]
    fn test_empty_log() {
        assert!(fold(&DiffLog::new()).is_empty());
    }
}
