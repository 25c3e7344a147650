//! Image and text layer producers.

pub mod resolve;
