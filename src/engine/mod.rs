//! Change detection, recompute passes and the event dispatcher.

pub mod editor;
pub mod fingerprint;
/// Fixpoint recompute over graph snapshots.
pub mod recompute;
