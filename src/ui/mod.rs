//! Terminal front-end: a consumer of controller snapshots.

pub mod dashboard;
pub mod field;
pub mod render;

pub use dashboard::{command_for, Command, DashboardState, Knob};
