//! HTTP handlers

pub mod health;
pub mod launch;

pub use health::health_check;
pub use launch::{
    apply_to_all_rows, edit_launch_row, get_launch_options, get_stock_status, open_launch,
    revert_launch, save_launch_draft, submit_launch,
};
