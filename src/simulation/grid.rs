//! The editable grid world: cell layout, legality, rewards and presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::simulation::config::ConfigError;
use crate::simulation::params::WALL_PENALTY;

/// Kind of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Goal,
    Lava,
    Start,
}

impl CellKind {
    /// All kinds in brush order.
    pub const ALL: [CellKind; 5] = [
        CellKind::Wall,
        CellKind::Empty,
        CellKind::Goal,
        CellKind::Lava,
        CellKind::Start,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::Goal => "goal",
            Self::Lava => "lava",
            Self::Start => "start",
        }
    }
}

/// Integer grid coordinate; `y = 0` is the top row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Deterministic layouts the grid can be regenerated from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    #[default]
    Open,
    Corridor,
    TwoRooms,
    Maze,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Open, Preset::Corridor, Preset::TwoRooms, Preset::Maze];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Corridor => "corridor",
            Self::TwoRooms => "two-rooms",
            Self::Maze => "maze",
        }
    }

    /// The preset after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Open => Self::Corridor,
            Self::Corridor => Self::TwoRooms,
            Self::TwoRooms => Self::Maze,
            Self::Maze => Self::Open,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted || p.name().replace('-', "_") == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

/// Reward values the grid hands out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardTable {
    pub step_cost: f64,
    pub goal_reward: f64,
    pub lava_penalty: f64,
}

/// A `width × height` grid of cells.
///
/// The layout only changes through [`GridWorld::set_cell`] or by building a new
/// grid from a [`Preset`]; nothing in the tick loop mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWorld {
    width: usize,
    height: usize,
    cells: Vec<CellKind>,
}

impl GridWorld {
    /// Creates an all-empty grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![CellKind::Empty; width * height],
        }
    }

    /// Builds the layout of `preset` at the given size.
    #[must_use]
    pub fn from_preset(width: usize, height: usize, preset: Preset) -> Self {
        let mut grid = Self::new(width, height);
        let (w, h) = (width, height);
        match preset {
            Preset::Open => {
                grid.set_cell(w - 1, 0, CellKind::Goal);
                grid.set_cell(0, h - 1, CellKind::Start);
                grid.set_cell(w - 2, h - 1, CellKind::Lava);
            }
            Preset::Corridor => {
                let lane = h / 2;
                for y in 1..h - 1 {
                    for x in 1..w - 1 {
                        if y != lane {
                            grid.set_cell(x, y, CellKind::Wall);
                        }
                    }
                }
                grid.set_cell(0, h - 1, CellKind::Start);
                grid.set_cell(w - 1, lane, CellKind::Goal);
            }
            Preset::TwoRooms => {
                let door = h / 2;
                let mid = w / 2;
                for y in (0..h).filter(|&y| y != door) {
                    grid.set_cell(mid, y, CellKind::Wall);
                }
                grid.set_cell(1, h - 1, CellKind::Start);
                grid.set_cell(w - 2, 0, CellKind::Goal);
                grid.set_cell(2, h - 2, CellKind::Lava);
            }
            Preset::Maze => {
                for y in (1..h - 1).step_by(2) {
                    for x in 1..w - 1 {
                        grid.set_cell(x, y, CellKind::Wall);
                    }
                    let gap = 1 + (y * 3) % (w - 2);
                    grid.set_cell(gap, y, CellKind::Empty);
                }
                grid.set_cell(0, h - 1, CellKind::Start);
                grid.set_cell(w - 1, 0, CellKind::Goal);
            }
        }
        grid
    }

    /// Copy of this layout at a new size. Overlapping cells are kept and new
    /// cells are empty.
    #[must_use]
    pub fn resized(&self, width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                grid.cells[y * width + x] = self.cells[y * self.width + x];
            }
        }
        grid
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Reads a cell; `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<CellKind> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Overwrites a cell. Returns `false` (and does nothing) out of bounds.
    ///
    /// No uniqueness check is made for start or goal cells.
    pub fn set_cell(&mut self, x: usize, y: usize, kind: CellKind) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = kind;
                true
            }
            None => false,
        }
    }

    /// In bounds and not a wall. Signed so a candidate one step off-grid can be tested.
    #[must_use]
    pub fn is_legal(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        matches!(
            self.cell(x as usize, y as usize),
            Some(kind) if kind != CellKind::Wall
        )
    }

    /// Goal and lava end an episode.
    #[must_use]
    pub fn is_terminal(&self, x: usize, y: usize) -> bool {
        matches!(self.cell(x, y), Some(CellKind::Goal | CellKind::Lava))
    }

    /// Reward for arriving at `(x, y)`.
    #[must_use]
    pub fn reward(&self, x: usize, y: usize, table: &RewardTable) -> f64 {
        match self.cell(x, y) {
            Some(CellKind::Goal) => table.goal_reward,
            Some(CellKind::Lava) => table.lava_penalty,
            Some(CellKind::Wall) => WALL_PENALTY,
            _ => table.step_cost,
        }
    }

    /// Start cells in row-major order.
    pub fn starts(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == CellKind::Start)
            .map(|(i, _)| Position::new(i % self.width, i / self.width))
    }

    /// First start cell, or the bottom-left corner when there is none.
    #[must_use]
    pub fn default_start(&self) -> Position {
        self.starts()
            .next()
            .unwrap_or_else(|| Position::new(0, self.height.saturating_sub(1)))
    }

    /// Number of cells of a given kind.
    #[must_use]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| **c == kind).count()
    }
}
