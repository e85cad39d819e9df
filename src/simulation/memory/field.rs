//! Per-cell, per-action associative memory with a glow eligibility trace.
//!
//! Two dense tensors of shape `H × W × 4` are stored flat:
//!
//! ```text
//! h[x, y, a]   long-term associative weight, starts at 1
//! g[x, y, a]   short-term glow, starts at 0
//! ```
//!
//! Each tick the glow decays, the chosen pair gains glow, and every weight is
//! updated with
//!
//! ```text
//! h ← h + (−γ·h + γ·1 + g·r·λ)
//! ```
//!
//! so weights relax toward 1 while glowing pairs absorb the reward.

use serde::{Deserialize, Serialize};

use crate::simulation::params::{G_MAX, G_MIN, H_BASELINE, H_MAX, H_MIN};
use crate::simulation::policy::{Action, ACTION_COUNT};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryField {
    width: usize,
    height: usize,
    h: Vec<f64>,
    g: Vec<f64>,
}

impl MemoryField {
    /// Allocates a neutral field: `h = 1`, `g = 0` everywhere.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height * ACTION_COUNT;
        Self {
            width,
            height,
            h: vec![H_BASELINE; len],
            g: vec![0.0; len],
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize, action: Action) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) outside memory");
        (y * self.width + x) * ACTION_COUNT + action.index()
    }

    /// Associative weight of one (cell, action) pair.
    #[must_use]
    pub fn h(&self, x: usize, y: usize, action: Action) -> f64 {
        self.h[self.idx(x, y, action)]
    }

    /// Glow of one (cell, action) pair.
    #[must_use]
    pub fn g(&self, x: usize, y: usize, action: Action) -> f64 {
        self.g[self.idx(x, y, action)]
    }

    /// The four h-values of a cell in action order.
    #[must_use]
    pub fn h_row(&self, x: usize, y: usize) -> [f64; ACTION_COUNT] {
        Action::ALL.map(|a| self.h(x, y, a))
    }

    /// Writes one h-value, clamped into `[H_MIN, H_MAX]`.
    pub fn set_h(&mut self, x: usize, y: usize, action: Action, value: f64) {
        let i = self.idx(x, y, action);
        self.h[i] = value.clamp(H_MIN, H_MAX);
    }

    /// `g ← g·(1−η)` everywhere.
    pub fn decay_glow(&mut self, eta: f64) {
        let keep = 1.0 - eta;
        for g in &mut self.g {
            *g *= keep;
        }
    }

    /// `g[x, y, a] += amount`; bounds are applied by [`Self::normalize`].
    pub fn add_glow(&mut self, x: usize, y: usize, action: Action, amount: f64) {
        let i = self.idx(x, y, action);
        self.g[i] += amount;
    }

    /// Applies the damped update to every entry of the field.
    pub fn reinforce(&mut self, reward: f64, gamma: f64, lambda: f64) {
        for (h, g) in self.h.iter_mut().zip(&self.g) {
            let delta = -gamma * *h + gamma * H_BASELINE + g * reward * lambda;
            *h += delta;
        }
    }

    /// Clamps h into `[0.1, 10]` and g into `[0, 5]`.
    pub fn normalize(&mut self) {
        for h in &mut self.h {
            *h = h.clamp(H_MIN, H_MAX);
        }
        for g in &mut self.g {
            *g = g.clamp(G_MIN, G_MAX);
        }
    }

    /// Clears glow at an episode boundary; h is kept.
    pub fn reset_episode_trace(&mut self) {
        self.g.fill(0.0);
    }

    /// Reallocates at new dimensions with neutral values.
    pub fn reset(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    /// h-values of a cell divided by their sum.
    #[must_use]
    pub fn action_preferences(&self, x: usize, y: usize) -> [f64; ACTION_COUNT] {
        let hs = self.h_row(x, y);
        let sum: f64 = hs.iter().sum();
        let sum = if sum > 0.0 { sum } else { 1.0 };
        hs.map(|h| h / sum)
    }

    /// Brightest glow among the four actions of a cell.
    #[must_use]
    pub fn max_glow(&self, x: usize, y: usize) -> f64 {
        Action::ALL
            .iter()
            .map(|&a| self.g(x, y, a))
            .fold(0.0, f64::max)
    }

    /// `(width, height)` of the field.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// All h-values in storage order.
    #[must_use]
    pub fn h_values(&self) -> &[f64] {
        &self.h
    }

    /// All glow values in storage order.
    #[must_use]
    pub fn g_values(&self) -> &[f64] {
        &self.g
    }

    /// Sum of all glow, handy for checking trace resets.
    #[must_use]
    pub fn total_glow(&self) -> f64 {
        self.g.iter().sum()
    }

    /// True when every entry lies inside its normalized bounds.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.h.iter().all(|h| (H_MIN..=H_MAX).contains(h))
            && self.g.iter().all(|g| (G_MIN..=G_MAX).contains(g))
    }
}
