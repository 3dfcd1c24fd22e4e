//! # Input Module
//!
//! Player commands as data. Front ends translate their own key bindings or
//! requests into [`Command`] values and hand them to the engine.

pub mod commands;

pub use commands::*;
