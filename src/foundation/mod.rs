//! Error taxonomy and typed identifiers.

/// Error types.
pub mod error;
/// String id newtypes.
pub mod ids;
