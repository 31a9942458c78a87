//! Shared domain logic for the purchase-order stock launch engine
//!
//! This crate turns pending purchase orders into launch rows, validates a
//! batch before it becomes inventory, and derives the order's stock status.
//! It performs no I/O; the backend and the WASM bindings drive it.

pub mod draft;
pub mod editing;
pub mod error;
pub mod models;
pub mod options;
pub mod planner;
pub mod pricing;
pub mod status;
pub mod submission;
pub mod types;
pub mod validation;

pub use draft::*;
pub use editing::*;
pub use error::*;
pub use models::*;
pub use options::*;
pub use planner::*;
pub use pricing::*;
pub use status::*;
pub use submission::*;
pub use types::*;
pub use validation::*;
