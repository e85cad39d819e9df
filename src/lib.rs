//! Grid-world sandbox for an online-learning agent.
//!
//! The agent keeps an associative weight per (cell, action) and a decaying
//! glow trace that decides which recent choices share in each reward. See
//! [`simulation::EpisodeController`] for the tick loop.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod simulation;
pub mod ui;
