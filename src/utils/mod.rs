//! # Utilities Module
//!
//! Grid search helpers shared by the autoexplore driver and tests.

pub mod pathfinding;

pub use pathfinding::*;
