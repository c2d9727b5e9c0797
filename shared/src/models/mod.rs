//! Domain models for the Stockbook platform

mod adjustment;
mod inventory;
mod report;
mod sale;

pub use adjustment::*;
pub use inventory::*;
pub use report::*;
pub use sale::*;
