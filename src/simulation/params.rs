//! Simulation hyperparameters, bounds and defaults.

use std::time::Duration;

// Grid dimensions
pub const MIN_WIDTH: usize = 4;
pub const MAX_WIDTH: usize = 30;
pub const MIN_HEIGHT: usize = 4;
pub const MAX_HEIGHT: usize = 22;
pub const DEFAULT_WIDTH: usize = 5;
pub const DEFAULT_HEIGHT: usize = 5;

// Rewards
pub const DEFAULT_STEP_COST: f64 = -0.01;
pub const STEP_COST_RANGE: (f64, f64) = (-0.2, 0.0);
pub const DEFAULT_GOAL_REWARD: f64 = 1.0;
pub const GOAL_REWARD_RANGE: (f64, f64) = (0.1, 10.0);
pub const DEFAULT_LAVA_PENALTY: f64 = -1.0;
pub const LAVA_PENALTY_RANGE: (f64, f64) = (-10.0, -0.1);
/// Reward for standing on a wall. Legal transitions never end on one.
pub const WALL_PENALTY: f64 = -0.2;

// Memory dynamics
pub const DEFAULT_DAMPING: f64 = 0.01; // γ
pub const DAMPING_RANGE: (f64, f64) = (0.01, 1.0);
pub const DEFAULT_REWARD_COUPLING: f64 = 1.0; // λ
pub const REWARD_COUPLING_RANGE: (f64, f64) = (0.0, 10.0);
pub const DEFAULT_GLOW_DECAY: f64 = 0.05; // η
pub const GLOW_DECAY_RANGE: (f64, f64) = (0.0, 1.0);

/// Neutral h-value every entry starts at and relaxes toward.
pub const H_BASELINE: f64 = 1.0;
pub const H_MIN: f64 = 0.1;
pub const H_MAX: f64 = 10.0;
pub const G_MIN: f64 = 0.0;
pub const G_MAX: f64 = 5.0;
/// Glow added to the selected (state, action) pair each tick.
pub const GLOW_INCREMENT: f64 = 1.0;

// Policy
pub const DEFAULT_EPSILON: f64 = 0.1;
pub const EPSILON_RANGE: (f64, f64) = (0.0, 1.0);
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const TEMPERATURE_RANGE: (f64, f64) = (0.05, 5.0);
/// Floor applied inside the softmax regardless of configuration.
pub const MIN_TEMPERATURE: f64 = 0.01;

// Wind
pub const WIND_CW_PROB: f64 = 0.1;
pub const WIND_CCW_PROB: f64 = 0.1;

// Scheduling
pub const DEFAULT_TICK_RATE: f64 = 12.0;
pub const TICK_RATE_RANGE: (f64, f64) = (1.0, 40.0);
pub const MIN_TICK_INTERVAL_MS: f64 = 20.0;

// Trace capacities
pub const REWARD_TRACE_LEN: usize = 10;
pub const CUMULATIVE_TRACE_LEN: usize = 1000;

/// Wall-clock interval between ticks for a rate in Hz.
///
/// `interval = max(20 ms, 1000 / rate)`; rates below 1 Hz are treated as 1 Hz.
#[must_use]
pub fn tick_interval(rate_hz: f64) -> Duration {
    let rate = if rate_hz.is_finite() { rate_hz.max(1.0) } else { DEFAULT_TICK_RATE };
    let millis = (1000.0 / rate).max(MIN_TICK_INTERVAL_MS);
    Duration::from_micros((millis * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval_floor() {
        assert_eq!(tick_interval(40.0), Duration::from_millis(25));
        assert_eq!(tick_interval(100.0), Duration::from_millis(20));
        assert_eq!(tick_interval(1.0), Duration::from_secs(1));
    }

    #[test]
    fn test_tick_interval_degenerate_rate() {
        assert_eq!(tick_interval(0.0), Duration::from_secs(1));
        assert_eq!(tick_interval(f64::NAN), tick_interval(DEFAULT_TICK_RATE));
    }
}
