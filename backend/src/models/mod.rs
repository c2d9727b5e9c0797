//! Database models for Stockbook
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
