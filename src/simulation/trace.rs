//! Reward bookkeeping: running totals plus the bounded series shown on screen.

use serde::{Deserialize, Serialize};

use crate::simulation::memory::RingBuffer;
use crate::simulation::params::{CUMULATIVE_TRACE_LEN, REWARD_TRACE_LEN};

/// Instantaneous reward at tick `t`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardPoint {
    pub t: u64,
    pub reward: f64,
}

/// All-time cumulative reward after tick `t`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub t: u64,
    pub total: f64,
}

/// Return of one finished episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReturn {
    pub episode: u64,
    pub ret: f64,
}

/// Accumulators owned by the controller.
#[derive(Clone, Debug)]
pub struct RewardLedger {
    /// Ticks executed since the last full reset
    pub t: u64,
    /// Index of the episode in progress, starting at 1
    pub episode: u64,
    pub episode_return: f64,
    pub episode_steps: u64,
    pub total_return: f64,
    pub rewards: RingBuffer<RewardPoint, REWARD_TRACE_LEN>,
    pub cumulative: RingBuffer<CumulativePoint, CUMULATIVE_TRACE_LEN>,
    pub episode_returns: Vec<EpisodeReturn>,
}

impl Default for RewardLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            t: 0,
            episode: 1,
            episode_return: 0.0,
            episode_steps: 0,
            total_return: 0.0,
            rewards: RingBuffer::new(),
            cumulative: RingBuffer::new(),
            episode_returns: Vec::new(),
        }
    }

    /// Books the reward of one tick.
    pub fn record(&mut self, reward: f64) {
        self.t += 1;
        self.total_return += reward;
        self.episode_return += reward;
        self.episode_steps += 1;
        self.rewards.push(RewardPoint { t: self.t, reward });
        self.cumulative.push(CumulativePoint {
            t: self.t,
            total: self.total_return,
        });
    }

    /// Closes the current episode and returns its entry.
    pub fn finish_episode(&mut self) -> EpisodeReturn {
        let entry = EpisodeReturn {
            episode: self.episode,
            ret: self.episode_return,
        };
        self.episode_returns.push(entry);
        self.episode += 1;
        self.episode_return = 0.0;
        self.episode_steps = 0;
        entry
    }
}
