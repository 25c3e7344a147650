//! Per-slot visibility controllers.

pub mod controller;
