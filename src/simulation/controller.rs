//! The tick loop and the single owner of all mutable simulation state.
//!
//! One call to [`EpisodeController::step`] runs a full tick:
//! 1. Select an action from the memory at the agent's cell.
//! 2. Decay all glow, then light up the chosen pair.
//! 3. Move (with wind, if enabled).
//! 4. Reward the arrival cell and reinforce the whole field.
//! 5. Book the reward; on a terminal cell close the episode and respawn.
//!
//! Grid, memory and agent position only change through `&mut self`, so a
//! presentation layer reading [`Snapshot`]s never sees a half-applied tick.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::simulation::config::{clamp_dimensions, LabConfig, Params};
use crate::simulation::grid::{CellKind, GridWorld, Position, Preset};
use crate::simulation::memory::MemoryField;
use crate::simulation::params::GLOW_INCREMENT;
use crate::simulation::policy::Action;
use crate::simulation::trace::{CumulativePoint, EpisodeReturn, RewardLedger, RewardPoint};

/// Whether a scheduler should be calling [`EpisodeController::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Running,
    Paused,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    /// Tick counter after this tick
    pub t: u64,
    pub from: Position,
    /// Action chosen by the policy
    pub action: Action,
    /// Action after wind
    pub realized: Action,
    /// Cell the agent arrived at (before any respawn)
    pub to: Position,
    pub reward: f64,
    /// Set when this tick ended an episode
    pub finished: Option<EpisodeReturn>,
}

impl TickOutcome {
    /// True when this tick ended an episode.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.finished.is_some()
    }
}

/// Read-only copy of everything a display needs after a tick.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub t: u64,
    pub run_state: RunState,
    pub agent: Position,
    pub spawn: Position,
    pub episode: u64,
    pub episode_return: f64,
    pub total_return: f64,
    pub reward_trace: Vec<RewardPoint>,
    pub cumulative_trace: Vec<CumulativePoint>,
    pub episode_returns: Vec<EpisodeReturn>,
    pub preset: Preset,
    pub params: Params,
    pub grid: GridWorld,
    pub memory: MemoryField,
}

/// Compact end-of-run report.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub episodes_completed: usize,
    pub total_return: f64,
    pub mean_episode_return: Option<f64>,
    pub last_episode_return: Option<f64>,
    pub agent: Position,
}

impl Snapshot {
    /// Condenses the snapshot into an end-of-run report.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let completed = self.episode_returns.len();
        let mean = (completed > 0).then(|| {
            self.episode_returns.iter().map(|e| e.ret).sum::<f64>() / completed as f64
        });
        RunSummary {
            ticks: self.t,
            episodes_completed: completed,
            total_return: self.total_return,
            mean_episode_return: mean,
            last_episode_return: self.episode_returns.last().map(|e| e.ret),
            agent: self.agent,
        }
    }
}

/// Owner of the grid, memory, agent and reward bookkeeping.
pub struct EpisodeController {
    preset: Preset,
    params: Params,
    grid: GridWorld,
    memory: MemoryField,
    agent: Position,
    spawn: Position,
    ledger: RewardLedger,
    run_state: RunState,
    rng: SmallRng,
}

impl EpisodeController {
    /// Builds a lab from a (clamped) configuration.
    #[must_use]
    pub fn new(config: LabConfig) -> Self {
        let config = config.clamped();
        let grid = GridWorld::from_preset(config.width, config.height, config.preset);
        let mut lab = Self::with_grid(grid, config.params, config.seed);
        lab.preset = config.preset;
        lab
    }

    /// Builds a lab around an arbitrary layout. A grid outside the size
    /// bounds is cropped or padded with empty cells to fit.
    #[must_use]
    pub fn with_grid(grid: GridWorld, params: Params, seed: Option<u64>) -> Self {
        let (width, height) = clamp_dimensions(grid.width(), grid.height());
        let grid = if (width, height) == (grid.width(), grid.height()) {
            grid
        } else {
            debug!(width, height, "fitting custom grid to size bounds");
            grid.resized(width, height)
        };
        let rng = seed.map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        let spawn = grid.default_start();
        Self {
            preset: Preset::default(),
            params: params.clamped(),
            memory: MemoryField::new(grid.width(), grid.height()),
            grid,
            agent: spawn,
            spawn,
            ledger: RewardLedger::new(),
            run_state: RunState::Running,
            rng,
        }
    }

    /// Runs one tick if the lab is running.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        match self.run_state {
            RunState::Running => Some(self.step()),
            RunState::Paused => None,
        }
    }

    /// Runs one tick regardless of the run state.
    pub fn step(&mut self) -> TickOutcome {
        let from = self.agent;
        let policy = self.params.policy();
        let action = policy.select_action(&self.memory, from.x, from.y, &mut self.rng);

        self.memory.decay_glow(self.params.eta);
        self.memory.add_glow(from.x, from.y, action, GLOW_INCREMENT);

        let mv = self
            .params
            .transition()
            .attempt_move(&self.grid, from, action, &mut self.rng);
        let to = mv.to;
        let reward = self.grid.reward(to.x, to.y, &self.params.reward_table());

        self.memory
            .reinforce(reward, self.params.gamma, self.params.lambda);
        self.memory.normalize();

        self.ledger.record(reward);
        self.agent = to;
        trace!(t = self.ledger.t, ?action, realized = ?mv.realized, %to, reward, "tick");

        let finished = if self.grid.is_terminal(to.x, to.y) {
            let steps = self.ledger.episode_steps;
            let entry = self.ledger.finish_episode();
            debug!(
                episode = entry.episode,
                ret = entry.ret,
                steps,
                "episode finished"
            );
            self.agent = self.spawn;
            self.memory.reset_episode_trace();
            Some(entry)
        } else {
            None
        };

        TickOutcome {
            t: self.ledger.t,
            from,
            action,
            realized: mv.realized,
            to,
            reward,
            finished,
        }
    }

    /// Starts or pauses the scheduler-driven ticks.
    pub fn set_running(&mut self, running: bool) {
        self.run_state = if running {
            RunState::Running
        } else {
            RunState::Paused
        };
    }

    /// Flips between running and paused, returning the new state.
    pub fn toggle_running(&mut self) -> RunState {
        self.set_running(!self.is_running());
        self.run_state
    }

    /// True while [`Self::tick`] advances the lab.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Forgets everything learned and recorded; the layout is kept.
    pub fn reset(&mut self) {
        self.memory.reset(self.grid.width(), self.grid.height());
        self.agent = self.spawn;
        self.ledger = RewardLedger::new();
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            "lab reset"
        );
    }

    /// Regenerates the grid from a preset at new dimensions and resets.
    ///
    /// Grid, memory and agent are replaced together.
    pub fn reconfigure(&mut self, width: usize, height: usize, preset: Preset) {
        let (width, height) = clamp_dimensions(width, height);
        self.grid = GridWorld::from_preset(width, height, preset);
        self.preset = preset;
        self.spawn = self.grid.default_start();
        info!(width, height, %preset, "grid regenerated");
        self.reset();
    }

    /// Replaces the parameters; they take effect from the next tick.
    pub fn set_params(&mut self, params: Params) {
        self.params = params.clamped();
    }

    /// Edits one cell. A new start cell becomes the spawn point and the agent
    /// moves there at once.
    pub fn set_cell(&mut self, x: usize, y: usize, kind: CellKind) -> bool {
        if !self.grid.set_cell(x, y, kind) {
            return false;
        }
        if kind == CellKind::Start {
            self.spawn = Position::new(x, y);
            self.agent = self.spawn;
        }
        true
    }

    /// Reads one cell of the layout; `None` outside the grid.
    #[must_use]
    pub fn pick_cell(&self, x: usize, y: usize) -> Option<CellKind> {
        self.grid.cell(x, y)
    }

    /// Copies the complete observable state into a [`Snapshot`].
    #[must_use]
    pub fn observe(&self) -> Snapshot {
        Snapshot {
            t: self.ledger.t,
            run_state: self.run_state,
            agent: self.agent,
            spawn: self.spawn,
            episode: self.ledger.episode,
            episode_return: self.ledger.episode_return,
            total_return: self.ledger.total_return,
            reward_trace: self.ledger.rewards.to_vec(),
            cumulative_trace: self.ledger.cumulative.to_vec(),
            episode_returns: self.ledger.episode_returns.clone(),
            preset: self.preset,
            params: self.params,
            grid: self.grid.clone(),
            memory: self.memory.clone(),
        }
    }

    /// Active (clamped) parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Preset the current layout was generated from.
    #[must_use]
    pub const fn preset(&self) -> Preset {
        self.preset
    }

    /// Current layout, edits included.
    #[must_use]
    pub const fn grid(&self) -> &GridWorld {
        &self.grid
    }

    /// Learned weights and glow.
    #[must_use]
    pub const fn memory(&self) -> &MemoryField {
        &self.memory
    }

    /// Direct access to the memory, e.g. to prime it with a learned policy.
    pub fn memory_mut(&mut self) -> &mut MemoryField {
        &mut self.memory
    }

    /// Where the agent stands now.
    #[must_use]
    pub const fn agent(&self) -> Position {
        self.agent
    }

    /// Active start cell used on respawn.
    #[must_use]
    pub const fn spawn(&self) -> Position {
        self.spawn
    }

    /// Ticks since the last full reset.
    #[must_use]
    pub const fn t(&self) -> u64 {
        self.ledger.t
    }

    /// Index of the episode in progress, starting at 1.
    #[must_use]
    pub const fn episode(&self) -> u64 {
        self.ledger.episode
    }

    /// Rewards collected so far in the current episode.
    #[must_use]
    pub const fn episode_return(&self) -> f64 {
        self.ledger.episode_return
    }

    /// Rewards collected since the last full reset.
    #[must_use]
    pub const fn total_return(&self) -> f64 {
        self.ledger.total_return
    }

    /// Returns of all finished episodes, oldest first.
    #[must_use]
    pub fn episode_returns(&self) -> &[EpisodeReturn] {
        &self.ledger.episode_returns
    }
}
