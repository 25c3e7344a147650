//! Media loading and draw tokens.

pub mod loader;
