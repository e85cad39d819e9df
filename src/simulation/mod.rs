pub mod config;
pub mod controller;
pub mod grid;
pub mod memory;
pub mod params;
pub mod policy;
pub mod trace;
pub mod transition;

pub use config::{ConfigError, LabConfig, Params};
pub use controller::{EpisodeController, RunState, Snapshot, TickOutcome};
pub use grid::{CellKind, GridWorld, Position, Preset};
pub use policy::{Action, ActionPolicy};
