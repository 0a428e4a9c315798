//! Diff entries and their textual form

use crate::model::{Hash256, NodeKind, TreeNode};
use std::fmt;

/// Whether a node left or joined the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffAction {
    Add,
    Delete,
}

impl DiffAction {
    pub fn symbol(&self) -> char {
        match self {
            DiffAction::Add => 'A',
            DiffAction::Delete => 'D',
        }
    }

    pub fn inverse(&self) -> Self {
        match self {
            DiffAction::Add => DiffAction::Delete,
            DiffAction::Delete => DiffAction::Add,
        }
    }
}

/// One recorded change between two tree snapshots
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiffEntry {
    pub action: DiffAction,
    pub kind: NodeKind,
    pub depth: usize,
    pub hash: Hash256,
    /// Content identity of a leaf (its ledger index); `None` for inner nodes.
    /// Not part of the rendered line.
    pub key: Option<Hash256>,
}

impl DiffEntry {
    pub fn new(action: DiffAction, node: &TreeNode, hash: Hash256, depth: usize) -> Self {
        DiffEntry {
            action,
            kind: node.kind(),
            depth,
            hash,
            key: node.identity(),
        }
    }

    pub fn is_add(&self) -> bool {
        self.action == DiffAction::Add
    }

    pub fn is_delete(&self) -> bool {
        self.action == DiffAction::Delete
    }

    /// The same entry seen from the other side of the diff
    pub fn inverse(&self) -> Self {
        DiffEntry {
            action: self.action.inverse(),
            ..self.clone()
        }
    }
}

/// Renders as `<A|D>,<kind-label>,<depth>,<HASH>`
impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.action.symbol(),
            self.kind.label(),
            self.depth,
            self.hash.to_hex()
        )
    }
}

/// Ordered sequence of diff entries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffLog {
    entries: Vec<DiffEntry>,
}

impl DiffLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: DiffEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn added_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_add()).count()
    }

    pub fn deleted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_delete()).count()
    }

    /// One rendered line per entry, in log order
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Every entry with its action swapped, order preserved
    pub fn inverted(&self) -> DiffLog {
        self.entries.iter().map(DiffEntry::inverse).collect()
    }
}

impl fmt::Display for DiffLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl FromIterator<DiffEntry> for DiffLog {
    fn from_iter<I: IntoIterator<Item = DiffEntry>>(iter: I) -> Self {
        DiffLog {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DiffLog {
    type Item = DiffEntry;
    type IntoIter = std::vec::IntoIter<DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiffLog {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
