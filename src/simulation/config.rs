//! Configuration boundary: parameters, clamping and loading.
//!
//! Everything that reaches the controller passes through [`Params::clamped`]
//! or [`LabConfig::clamped`], so the tick loop never sees out-of-range or
//! non-finite values.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::grid::{Preset, RewardTable};
use crate::simulation::params::{
    DAMPING_RANGE, DEFAULT_DAMPING, DEFAULT_EPSILON, DEFAULT_GLOW_DECAY, DEFAULT_GOAL_REWARD,
    DEFAULT_HEIGHT, DEFAULT_LAVA_PENALTY, DEFAULT_REWARD_COUPLING, DEFAULT_STEP_COST,
    DEFAULT_TEMPERATURE, DEFAULT_TICK_RATE, DEFAULT_WIDTH, EPSILON_RANGE, GLOW_DECAY_RANGE,
    GOAL_REWARD_RANGE, LAVA_PENALTY_RANGE, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
    REWARD_COUPLING_RANGE, STEP_COST_RANGE, TEMPERATURE_RANGE, TICK_RATE_RANGE,
};
use crate::simulation::policy::ActionPolicy;
use crate::simulation::transition::TransitionModel;

/// Errors raised while reading configuration from outside the core.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown preset '{0}' (expected open, corridor, two-rooms or maze)")]
    UnknownPreset(String),
}

/// Clamps `value` into `range`, replacing non-finite input with `fallback`.
fn clamp_or(value: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

/// Tunable simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Reward for every non-terminal step
    pub step_cost: f64,
    pub goal_reward: f64,
    pub lava_penalty: f64,
    /// Random ±1 rotation of the chosen action
    pub wind: bool,
    /// Memory damping γ
    pub gamma: f64,
    /// Reward coupling λ
    pub lambda: f64,
    /// Glow decay η
    pub eta: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Softmax temperature τ
    pub tau: f64,
    /// Ticks per second when driven by a scheduler
    pub tick_rate: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            step_cost: DEFAULT_STEP_COST,
            goal_reward: DEFAULT_GOAL_REWARD,
            lava_penalty: DEFAULT_LAVA_PENALTY,
            wind: false,
            gamma: DEFAULT_DAMPING,
            lambda: DEFAULT_REWARD_COUPLING,
            eta: DEFAULT_GLOW_DECAY,
            epsilon: DEFAULT_EPSILON,
            tau: DEFAULT_TEMPERATURE,
            tick_rate: DEFAULT_TICK_RATE,
        }
    }
}

impl Params {
    /// Pulls every field into its valid range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            step_cost: clamp_or(self.step_cost, STEP_COST_RANGE, d.step_cost),
            goal_reward: clamp_or(self.goal_reward, GOAL_REWARD_RANGE, d.goal_reward),
            lava_penalty: clamp_or(self.lava_penalty, LAVA_PENALTY_RANGE, d.lava_penalty),
            wind: self.wind,
            gamma: clamp_or(self.gamma, DAMPING_RANGE, d.gamma),
            lambda: clamp_or(self.lambda, REWARD_COUPLING_RANGE, d.lambda),
            eta: clamp_or(self.eta, GLOW_DECAY_RANGE, d.eta),
            epsilon: clamp_or(self.epsilon, EPSILON_RANGE, d.epsilon),
            tau: clamp_or(self.tau, TEMPERATURE_RANGE, d.tau),
            tick_rate: clamp_or(self.tick_rate, TICK_RATE_RANGE, d.tick_rate),
        }
    }

    #[must_use]
    pub const fn reward_table(&self) -> RewardTable {
        RewardTable {
            step_cost: self.step_cost,
            goal_reward: self.goal_reward,
            lava_penalty: self.lava_penalty,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> ActionPolicy {
        ActionPolicy::new(self.epsilon, self.tau)
    }

    #[must_use]
    pub const fn transition(&self) -> TransitionModel {
        TransitionModel::new(self.wind)
    }
}

/// Full lab setup: grid shape, layout, parameters and seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub width: usize,
    pub height: usize,
    pub preset: Preset,
    pub params: Params,
    /// Seed for reproducible runs; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            preset: Preset::default(),
            params: Params::default(),
            seed: None,
        }
    }
}

impl LabConfig {
    /// Reads a JSON config; missing fields take their defaults. The result is clamped.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.clamped())
    }

    #[must_use]
    pub fn clamped(self) -> Self {
        let (width, height) = clamp_dimensions(self.width, self.height);
        Self {
            width,
            height,
            params: self.params.clamped(),
            ..self
        }
    }
}

/// Grid dimensions pulled into `[4, 30] × [4, 22]`.
#[must_use]
pub fn clamp_dimensions(width: usize, height: usize) -> (usize, usize) {
    (
        width.clamp(MIN_WIDTH, MAX_WIDTH),
        height.clamp(MIN_HEIGHT, MAX_HEIGHT),
    )
}
