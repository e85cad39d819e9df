//! Presentation state and the commands the terminal front-end can issue.
//!
//! The dashboard never mutates simulation state directly: commands go through
//! the controller's edit and control surface, and the view is refreshed from a
//! fresh [`Snapshot`] afterwards.

use crossterm::event::KeyCode;

use crate::simulation::config::Params;
use crate::simulation::controller::{EpisodeController, RunState, Snapshot};
use crate::simulation::grid::{CellKind, Position};

/// User intents decoded from key presses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Quit,
    ToggleRun,
    Step,
    Reset,
    NextPreset,
    MoveCursor(isize, isize),
    SelectBrush(CellKind),
    Paint,
    Erase,
    Pick,
    ToggleWind,
    /// Moves the parameter selection by the given number of slots
    SelectKnob(isize),
    /// Nudges the selected parameter by this many steps
    AdjustKnob(f64),
    Resize(isize, isize),
}

/// A live-tunable parameter of the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Knob {
    StepCost,
    GoalReward,
    LavaPenalty,
    Gamma,
    Lambda,
    Eta,
    Epsilon,
    Tau,
    #[default]
    TickRate,
}

impl Knob {
    /// Selection order on screen.
    pub const ALL: [Knob; 9] = [
        Knob::StepCost,
        Knob::GoalReward,
        Knob::LavaPenalty,
        Knob::Gamma,
        Knob::Lambda,
        Knob::Eta,
        Knob::Epsilon,
        Knob::Tau,
        Knob::TickRate,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StepCost => "step",
            Self::GoalReward => "goal",
            Self::LavaPenalty => "lava",
            Self::Gamma => "γ",
            Self::Lambda => "λ",
            Self::Eta => "η",
            Self::Epsilon => "ε",
            Self::Tau => "τ",
            Self::TickRate => "Hz",
        }
    }

    /// Amount one key press changes the parameter by.
    #[must_use]
    pub const fn increment(self) -> f64 {
        match self {
            Self::StepCost | Self::Gamma | Self::Eta | Self::Epsilon => 0.01,
            Self::GoalReward | Self::LavaPenalty => 0.1,
            Self::Tau => 0.05,
            Self::Lambda | Self::TickRate => 1.0,
        }
    }

    const fn decimals(self) -> usize {
        match self {
            Self::Lambda | Self::TickRate => 0,
            Self::GoalReward | Self::LavaPenalty => 1,
            _ => 2,
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    /// Knob `offset` slots away, wrapping around.
    #[must_use]
    pub fn cycle(self, offset: isize) -> Self {
        let n = Self::ALL.len() as isize;
        let i = (self.position() as isize + offset).rem_euclid(n);
        Self::ALL[i as usize]
    }

    #[must_use]
    pub const fn get(self, params: &Params) -> f64 {
        match self {
            Self::StepCost => params.step_cost,
            Self::GoalReward => params.goal_reward,
            Self::LavaPenalty => params.lava_penalty,
            Self::Gamma => params.gamma,
            Self::Lambda => params.lambda,
            Self::Eta => params.eta,
            Self::Epsilon => params.epsilon,
            Self::Tau => params.tau,
            Self::TickRate => params.tick_rate,
        }
    }

    /// Copy of `params` with this knob set to `value` (unclamped).
    #[must_use]
    pub fn with(self, params: Params, value: f64) -> Params {
        let mut p = params;
        match self {
            Self::StepCost => p.step_cost = value,
            Self::GoalReward => p.goal_reward = value,
            Self::LavaPenalty => p.lava_penalty = value,
            Self::Gamma => p.gamma = value,
            Self::Lambda => p.lambda = value,
            Self::Eta => p.eta = value,
            Self::Epsilon => p.epsilon = value,
            Self::Tau => p.tau = value,
            Self::TickRate => p.tick_rate = value,
        }
        p
    }

    /// Moves the value by `steps` increments, snapped to the increment grid.
    #[must_use]
    pub fn nudged(self, params: Params, steps: f64) -> Params {
        let inc = self.increment();
        let value = ((self.get(&params) / inc).round() + steps) * inc;
        self.with(params, value)
    }

    /// `label value` at the knob's display precision.
    #[must_use]
    pub fn format(self, params: &Params) -> String {
        format!("{} {:.*}", self.label(), self.decimals(), self.get(params))
    }
}

/// Key bindings of the terminal dashboard.
#[must_use]
pub fn command_for(code: KeyCode) -> Option<Command> {
    let cmd = match code {
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char(' ') => Command::ToggleRun,
        KeyCode::Char('s') => Command::Step,
        KeyCode::Char('r') => Command::Reset,
        KeyCode::Char('n') => Command::NextPreset,
        KeyCode::Up => Command::MoveCursor(0, -1),
        KeyCode::Down => Command::MoveCursor(0, 1),
        KeyCode::Left => Command::MoveCursor(-1, 0),
        KeyCode::Right => Command::MoveCursor(1, 0),
        KeyCode::Char(c @ '1'..='5') => {
            Command::SelectBrush(CellKind::ALL[(c as usize) - ('1' as usize)])
        }
        KeyCode::Enter => Command::Paint,
        KeyCode::Char('x') => Command::Erase,
        KeyCode::Char('p') => Command::Pick,
        KeyCode::Char('w') => Command::ToggleWind,
        KeyCode::Tab => Command::SelectKnob(1),
        KeyCode::BackTab => Command::SelectKnob(-1),
        KeyCode::Char('+' | '=') => Command::AdjustKnob(1.0),
        KeyCode::Char('-') => Command::AdjustKnob(-1.0),
        KeyCode::Char(']') => Command::Resize(1, 0),
        KeyCode::Char('[') => Command::Resize(-1, 0),
        KeyCode::Char('}') => Command::Resize(0, 1),
        KeyCode::Char('{') => Command::Resize(0, -1),
        _ => return None,
    };
    Some(cmd)
}

/// Everything the renderer needs, refreshed after each tick or command.
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub snapshot: Snapshot,
    pub cursor: Position,
    pub brush: CellKind,
    /// Parameter that `+`/`-` adjust
    pub knob: Knob,
    pub status: String,
}

impl DashboardState {
    #[must_use]
    pub fn new(lab: &EpisodeController) -> Self {
        Self {
            snapshot: lab.observe(),
            cursor: Position::new(0, 0),
            brush: CellKind::Wall,
            knob: Knob::default(),
            status: String::from(
                "space: run/pause  s: step  r: reset  n: preset  tab: parameter  +/-: adjust  q: quit",
            ),
        }
    }

    /// Pulls a new snapshot and keeps the cursor on the grid.
    pub fn refresh(&mut self, lab: &EpisodeController) {
        self.snapshot = lab.observe();
        let grid = &self.snapshot.grid;
        self.cursor.x = self.cursor.x.min(grid.width() - 1);
        self.cursor.y = self.cursor.y.min(grid.height() - 1);
    }

    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        let grid = &self.snapshot.grid;
        let max_x = grid.width() as isize - 1;
        let max_y = grid.height() as isize - 1;
        self.cursor.x = (self.cursor.x as isize + dx).clamp(0, max_x) as usize;
        self.cursor.y = (self.cursor.y as isize + dy).clamp(0, max_y) as usize;
    }

    /// Applies a command. Returns `false` when the user asked to quit.
    pub fn apply(&mut self, cmd: Command, lab: &mut EpisodeController) -> bool {
        let Position { x, y } = self.cursor;
        match cmd {
            Command::Quit => return false,
            Command::ToggleRun => {
                let state = lab.toggle_running();
                self.status = format!("{state:?}");
            }
            Command::Step => {
                let out = lab.step();
                self.status = format!(
                    "t={} {:?}→{:?} r={:.2}",
                    out.t, out.action, out.realized, out.reward
                );
            }
            Command::Reset => {
                lab.reset();
                self.status = String::from("memory and traces reset");
            }
            Command::NextPreset => {
                let grid = lab.grid();
                let (w, h) = (grid.width(), grid.height());
                let preset = lab.preset().next();
                lab.reconfigure(w, h, preset);
                self.status = format!("preset: {preset}");
            }
            Command::MoveCursor(dx, dy) => self.move_cursor(dx, dy),
            Command::SelectBrush(kind) => {
                self.brush = kind;
                self.status = format!("brush: {}", kind.label());
            }
            Command::Paint => {
                lab.set_cell(x, y, self.brush);
            }
            Command::Erase => {
                lab.set_cell(x, y, CellKind::Empty);
            }
            Command::Pick => {
                if let Some(kind) = lab.pick_cell(x, y) {
                    self.brush = kind;
                    self.status = format!("picked brush: {}", kind.label());
                }
            }
            Command::ToggleWind => {
                let params = Params {
                    wind: !lab.params().wind,
                    ..*lab.params()
                };
                lab.set_params(params);
            }
            Command::SelectKnob(offset) => {
                self.knob = self.knob.cycle(offset);
                self.status = format!("adjusting {}", self.knob.format(lab.params()));
            }
            Command::AdjustKnob(steps) => {
                lab.set_params(self.knob.nudged(*lab.params(), steps));
                self.status = self.knob.format(lab.params());
            }
            Command::Resize(dw, dh) => {
                let grid = lab.grid();
                let w = (grid.width() as isize + dw).max(0) as usize;
                let h = (grid.height() as isize + dh).max(0) as usize;
                lab.reconfigure(w, h, lab.preset());
            }
        }
        self.refresh(lab);
        true
    }

    /// Status header: counters, run state and every tunable parameter, with
    /// the selected one in brackets.
    #[must_use]
    pub fn hud_line(&self) -> String {
        let s = &self.snapshot;
        let state = match s.run_state {
            RunState::Running => "running",
            RunState::Paused => "paused",
        };
        let knobs: Vec<String> = Knob::ALL
            .iter()
            .map(|&k| {
                let text = k.format(&s.params);
                if k == self.knob {
                    format!("[{text}]")
                } else {
                    text
                }
            })
            .collect();
        format!(
            "t: {} | Ep: {} | G: {:.2} | Total: {:.2} | Wind: {} | {} | {}",
            s.t,
            s.episode,
            s.episode_return,
            s.total_return,
            if s.params.wind { "on" } else { "off" },
            state,
            knobs.join("  "),
        )
    }

    /// h-values, action preferences and glow of the cell under the cursor.
    #[must_use]
    pub fn inspect_line(&self) -> String {
        let Position { x, y } = self.cursor;
        let memory = &self.snapshot.memory;
        let hs = memory.h_row(x, y);
        let prefs = memory.action_preferences(x, y);
        format!(
            "cell ({x},{y}) h: [↑ {:.2}, → {:.2}, ↓ {:.2}, ← {:.2}] pref: [↑ {:.2}, → {:.2}, ↓ {:.2}, ← {:.2}] glow max={:.2} | brush: {}",
            hs[0],
            hs[1],
            hs[2],
            hs[3],
            prefs[0],
            prefs[1],
            prefs[2],
            prefs[3],
            memory.max_glow(x, y),
            self.brush.label(),
        )
    }
}
