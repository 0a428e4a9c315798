//! Content-addressed node storage
//!
//! The diff and summary passes only ever read through [`NodeStore`]. Writing
//! goes through [`NodeSink`], which the tree builder uses to produce
//! fixtures and snapshot files.

mod memory;
mod record;
mod snapshot;

pub use memory::MemoryStore;
pub use record::{Record, RecordType};
pub use snapshot::SnapshotFile;

use crate::model::{Hash256, TreeNode};
use crate::Result;

/// Read-only lookup of decoded nodes by hash.
///
/// Implementations must be safe for concurrent reads; independent diffs and
/// fills may share one store across threads.
pub trait NodeStore: Send + Sync {
    /// Fetch a node. A missing hash is [`crate::Error::NotFound`]; any other
    /// failure is reported as-is.
    fn get(&self, hash: &Hash256) -> Result<TreeNode>;

    fn contains(&self, hash: &Hash256) -> bool {
        self.get(hash).is_ok()
    }
}

/// Destination for freshly built nodes
pub trait NodeSink {
    /// Store a node under its computed hash and return that hash
    fn put(&self, node: &TreeNode) -> Result<Hash256>;
}

impl<S: NodeStore + ?Sized> NodeStore for &S {
    fn get(&self, hash: &Hash256) -> Result<TreeNode> {
        (**self).get(hash)
    }

    fn contains(&self, hash: &Hash256) -> bool {
        (**self).contains(hash)
    }
}

impl<S: NodeStore + ?Sized> NodeStore for std::sync::Arc<S> {
    fn get(&self, hash: &Hash256) -> Result<TreeNode> {
        (**self).get(hash)
    }

    fn contains(&self, hash: &Hash256) -> bool {
        (**self).contains(hash)
    }
}
