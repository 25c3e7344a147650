//! Upstream layer collection for cascades and previews.

/// Layer collectors.
pub mod layers;
