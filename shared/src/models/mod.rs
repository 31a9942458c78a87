//! Domain models for purchase orders and the inventory they launch

mod launch;
mod purchase;

pub use launch::*;
pub use purchase::*;
