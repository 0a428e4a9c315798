//! State tree construction
//!
//! Produces the content-addressed radix tree that diffs and summaries walk:
//! - Every node is keyed by the hash of its content
//! - Unchanged subtrees share storage across snapshots
//! - The root hash identifies the entire ledger state

mod builder;

pub use builder::TreeBuilder;
