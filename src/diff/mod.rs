//! Structural diffs between state tree snapshots

mod engine;
mod fold;
mod log;

pub use engine::{diff, DiffEngine};
pub use fold::fold;
pub use log::{DiffAction, DiffEntry, DiffLog};
