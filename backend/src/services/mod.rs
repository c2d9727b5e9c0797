//! Business logic services for Stockbook

pub mod inventory;
pub mod reporting;
pub mod sales;
