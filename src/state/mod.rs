//! Whole-tree statistics for a single snapshot

mod ledger;
mod summary;

pub use ledger::LedgerState;
pub use summary::{Summary, SUMMARY_FIELDS};
