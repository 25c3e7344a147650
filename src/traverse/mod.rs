//! Cycle-safe graph walks.

pub mod chain;
