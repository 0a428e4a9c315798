//! # ledger_diff
//!
//! Structural diffs and summaries over content-addressed ledger state trees.
//!
//! A ledger's account state is a radix-16 hash tree: inner nodes hold up to
//! sixteen child hashes, leaves hold typed ledger objects, and every node is
//! identified by the hash of its content. Two snapshots of that tree, e.g.
//! consecutive ledger closes, usually differ along a handful of paths.
//!
//! ## Core Concepts
//!
//! - **Diff**: lockstep walk of two trees that prunes equal hashes and logs
//!   every changed node as a Delete/Add entry
//! - **Fold**: removes leaves that merely moved because a neighbour was
//!   inserted or deleted
//! - **LedgerState**: full traversal of one tree yielding per-kind counts
//! - **NodeStore**: read-only lookup of nodes by hash, supplied by the caller
//!
//! ## Example
//!
//! ```ignore
//! use ledger_diff::{diff, fold, SnapshotFile};
//!
//! let snapshot = SnapshotFile::open("ledgers.lds")?;
//! let old = snapshot.resolve("38128")?;
//! let new = snapshot.resolve("38129")?;
//! let log = fold(&diff(old, new, &snapshot)?);
//! println!("{}", log);
//! ```

pub mod config;
pub mod diff;
pub mod model;
pub mod state;
pub mod store;
pub mod tree;

mod error;

pub use config::Config;
pub use diff::{diff, fold, DiffAction, DiffEngine, DiffEntry, DiffLog};
pub use error::{Error, Result};
pub use model::{Hash256, InnerNode, LeafNode, NodeKind, TreeNode};
pub use state::{LedgerState, Summary};
pub use store::{MemoryStore, NodeSink, NodeStore, SnapshotFile};
pub use tree::TreeBuilder;

/// Snapshot file format version
pub const VERSION: u32 = 1;

/// Magic bytes for snapshot file identification
pub const MAGIC: &[u8; 8] = b"LDGRSNAP";
