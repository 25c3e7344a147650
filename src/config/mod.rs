//! Layer slot registry and style tables.

/// Slot registry.
pub mod layers;
pub mod style;
