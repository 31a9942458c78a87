//! Business logic services for the purchase launch server

pub mod launch;

pub use launch::{
    EditedRows, LaunchReceipt, LaunchService, LaunchSession, OpenSession, RevertReceipt,
    StatusReport, SubmitOutcome,
};
