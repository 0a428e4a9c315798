//! Core data model types for ledger_diff

mod hash;
mod kind;
mod node;

pub use hash::Hash256;
pub use kind::NodeKind;
pub use node::{InnerNode, LeafNode, TreeNode, BRANCH_FACTOR, MAX_TREE_DEPTH};
