//! Shared types and models for the Stockbook inventory and sales backend
//!
//! This crate holds the domain models and the stock bookkeeping rules. It does
//! no I/O: the backend loads records, applies the rules defined here and
//! persists the result.

pub mod bookkeeping;
pub mod models;
pub mod reporting;
pub mod types;
pub mod validation;

pub use bookkeeping::*;
pub use models::*;
pub use reporting::*;
pub use types::*;
pub use validation::*;
