//! Timeline frame building.

/// Frames built from a chain of image producers.
pub mod frames;
