//! Workflow graph model and the copy-on-write store.

pub mod model;
/// Copy-on-write graph snapshots.
pub mod store;
