//! Stochastic action selection over the memory field.
//!
//! With probability ε the agent explores uniformly. Otherwise it samples from
//! a temperature-scaled softmax over the four h-values of its cell:
//!
//! ```text
//! p[a] = exp((h[a] − max h) / τ) / Σₖ exp((h[k] − max h) / τ)
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::simulation::memory::MemoryField;
use crate::simulation::params::MIN_TEMPERATURE;

pub const ACTION_COUNT: usize = 4;

/// Moves available in every cell, in the fixed cycle order used by wind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [Action::Up, Action::Right, Action::Down, Action::Left];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Maps `i mod 4` onto the action cycle.
    #[must_use]
    pub const fn from_index(i: usize) -> Self {
        Self::ALL[i % ACTION_COUNT]
    }

    /// Next action clockwise: up → right → down → left → up.
    #[must_use]
    pub const fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub const fn rotate_ccw(self) -> Self {
        Self::from_index(self.index() + ACTION_COUNT - 1)
    }

    /// Unit displacement `(dx, dy)`; y grows downward.
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    #[must_use]
    pub const fn arrow(self) -> char {
        match self {
            Self::Up => '↑',
            Self::Right => '→',
            Self::Down => '↓',
            Self::Left => '←',
        }
    }
}

/// Epsilon-uniform exploration mixed with a softmax over h-values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActionPolicy {
    /// Probability of a uniformly random action
    pub epsilon: f64,
    /// Softmax temperature; floored at `MIN_TEMPERATURE` when used
    pub temperature: f64,
}

impl ActionPolicy {
    #[must_use]
    pub const fn new(epsilon: f64, temperature: f64) -> Self {
        Self { epsilon, temperature }
    }

    fn effective_temperature(&self) -> f64 {
        self.temperature.max(MIN_TEMPERATURE)
    }

    /// Softmax over the h-values of one cell, shifted by the max for stability.
    #[must_use]
    pub fn softmax(&self, hs: [f64; ACTION_COUNT]) -> [f64; ACTION_COUNT] {
        let tau = self.effective_temperature();
        let max_h = hs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps = hs.map(|h| ((h - max_h) / tau).exp());
        let sum: f64 = exps.iter().sum();
        exps.map(|e| e / sum)
    }

    /// Full action distribution at a cell, exploration included.
    #[must_use]
    pub fn probabilities(&self, memory: &MemoryField, x: usize, y: usize) -> [f64; ACTION_COUNT] {
        let eps = self.epsilon.clamp(0.0, 1.0);
        let uniform = 1.0 / ACTION_COUNT as f64;
        self.softmax(memory.h_row(x, y))
            .map(|p| eps * uniform + (1.0 - eps) * p)
    }

    /// Picks an action for the agent standing at `(x, y)`.
    pub fn select_action<R: Rng>(
        &self,
        memory: &MemoryField,
        x: usize,
        y: usize,
        rng: &mut R,
    ) -> Action {
        if rng.random::<f64>() < self.epsilon {
            return Action::from_index(rng.random_range(0..ACTION_COUNT));
        }

        let probs = self.softmax(memory.h_row(x, y));
        sample_cumulative(&probs, rng.random::<f64>())
    }
}

/// First action whose running cumulative probability reaches `draw`.
fn sample_cumulative(probs: &[f64; ACTION_COUNT], draw: f64) -> Action {
    let mut acc = 0.0;
    for (i, p) in probs.iter().enumerate() {
        acc += p;
        if draw <= acc {
            return Action::from_index(i);
        }
    }
    // Rounding left the total just below the draw.
    probs
        .iter()
        .rposition(|&p| p > 0.0)
        .map_or(Action::Up, Action::from_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_cycle() {
        assert_eq!(Action::Up.rotate_cw(), Action::Right);
        assert_eq!(Action::Left.rotate_cw(), Action::Up);
        assert_eq!(Action::Up.rotate_ccw(), Action::Left);
        assert_eq!(Action::Down.rotate_ccw(), Action::Right);
        for a in Action::ALL {
            assert_eq!(a.rotate_cw().rotate_ccw(), a);
        }
    }

    #[test]
    fn test_uniform_memory_gives_uniform_softmax() {
        let policy = ActionPolicy::new(0.0, 1.0);
        let probs = policy.softmax([1.0; ACTION_COUNT]);
        for p in probs {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_low_temperature_sharpens() {
        let sharp = ActionPolicy::new(0.0, 0.05).softmax([1.0, 2.0, 1.0, 1.0]);
        let flat = ActionPolicy::new(0.0, 5.0).softmax([1.0, 2.0, 1.0, 1.0]);
        assert!(sharp[1] > 0.999);
        assert!(flat[1] < 0.35);
    }

    #[test]
    fn test_zero_temperature_is_floored() {
        let probs = ActionPolicy::new(0.0, 0.0).softmax([10.0, 10.0, 0.1, 0.1]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cumulative_boundary_picks_first() {
        let probs = [0.25, 0.25, 0.25, 0.25];
        assert_eq!(sample_cumulative(&probs, 0.0), Action::Up);
        assert_eq!(sample_cumulative(&probs, 0.25), Action::Up);
        assert_eq!(sample_cumulative(&probs, 0.5), Action::Right);
        assert_eq!(sample_cumulative(&probs, 0.99), Action::Left);
    }

    #[test]
    fn test_cumulative_fallback_skips_zero_tail() {
        let probs = [0.3, 0.3, 0.3, 0.0];
        assert_eq!(sample_cumulative(&probs, 0.95), Action::Down);
    }
}
