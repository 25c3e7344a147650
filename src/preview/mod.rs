//! Preview aggregation and render lists.

/// Display layers and render frames.
pub mod aggregator;
