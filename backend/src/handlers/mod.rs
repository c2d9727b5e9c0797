//! HTTP handlers

pub mod health;
pub mod inventory;
pub mod sales;

pub use health::{health_check, root};
pub use inventory::*;
pub use sales::*;
