//! Interactive two-pane dashboard.

pub mod app;
pub mod ui;
