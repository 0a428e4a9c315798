//! Fixed-order count vector over one state tree

use crate::model::NodeKind;
use serde::Serialize;
use std::fmt;

/// Number of values in a rendered summary
pub const SUMMARY_FIELDS: usize = NodeKind::LEAF_KINDS.len() + 4;

/// Per-kind and shape statistics for one traversal.
///
/// Field order when rendered: one count per leaf kind in
/// [`NodeKind::LEAF_KINDS`] order, then `inner_nodes`, `leaf_nodes`,
/// `max_depth` and `empty_slots`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub kind_counts: [u64; NodeKind::LEAF_KINDS.len()],
    pub inner_nodes: u64,
    pub leaf_nodes: u64,
    pub max_depth: u64,
    /// Unoccupied child slots summed over all inner nodes
    pub empty_slots: u64,
}

impl Summary {
    /// Count for one kind; inner nodes report the inner bucket
    pub fn count(&self, kind: NodeKind) -> u64 {
        match kind.leaf_index() {
            Some(i) => self.kind_counts[i],
            None => self.inner_nodes,
        }
    }

    pub fn total_nodes(&self) -> u64 {
        self.inner_nodes + self.leaf_nodes
    }

    /// All values in rendering order
    pub fn fields(&self) -> Vec<u64> {
        let mut fields = Vec::with_capacity(SUMMARY_FIELDS);
        fields.extend_from_slice(&self.kind_counts);
        fields.extend([
            self.inner_nodes,
            self.leaf_nodes,
            self.max_depth,
            self.empty_slots,
        ]);
        fields
    }

    /// Labels matching [`Summary::fields`]
    pub fn field_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> =
            NodeKind::LEAF_KINDS.iter().map(|k| k.label()).collect();
        names.extend(["inner_nodes", "leaf_nodes", "max_depth", "empty_slots"]);
        names
    }
}

/// Comma-separated decimal integers, no header, no trailing separator
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self
            .fields()
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&line)
    }
}
