//! Applies an action to a position, optionally blown off course by wind.

use rand::Rng;

use crate::simulation::grid::{GridWorld, Position};
use crate::simulation::params::{WIND_CCW_PROB, WIND_CW_PROB};
use crate::simulation::policy::Action;

/// Result of one movement attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    /// Where the agent ends up; the start position if the move was blocked
    pub to: Position,
    /// Direction actually taken after wind
    pub realized: Action,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransitionModel {
    pub wind: bool,
}

impl TransitionModel {
    #[must_use]
    pub const fn new(wind: bool) -> Self {
        Self { wind }
    }

    /// Rotates `action` one step clockwise or counter-clockwise with 10% each
    /// when wind is on.
    pub fn perturb<R: Rng>(&self, action: Action, rng: &mut R) -> Action {
        if !self.wind {
            return action;
        }
        let r: f64 = rng.random();
        if r < WIND_CW_PROB {
            action.rotate_cw()
        } else if r < WIND_CW_PROB + WIND_CCW_PROB {
            action.rotate_ccw()
        } else {
            action
        }
    }

    /// Moves one cell in the (possibly perturbed) direction. Illegal targets
    /// leave the agent where it was.
    pub fn attempt_move<R: Rng>(
        &self,
        grid: &GridWorld,
        from: Position,
        action: Action,
        rng: &mut R,
    ) -> Move {
        let realized = self.perturb(action, rng);
        Move {
            to: step(grid, from, realized),
            realized,
        }
    }
}

/// Deterministic one-cell step with bump-into-wall semantics.
#[must_use]
pub fn step(grid: &GridWorld, from: Position, action: Action) -> Position {
    let (dx, dy) = action.delta();
    let nx = from.x as isize + dx;
    let ny = from.y as isize + dy;
    if grid.is_legal(nx, ny) {
        Position::new(nx as usize, ny as usize)
    } else {
        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::grid::CellKind;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_step_moves_one_cell() {
        let grid = GridWorld::new(4, 4);
        let p = Position::new(1, 1);
        assert_eq!(step(&grid, p, Action::Up), Position::new(1, 0));
        assert_eq!(step(&grid, p, Action::Right), Position::new(2, 1));
        assert_eq!(step(&grid, p, Action::Down), Position::new(1, 2));
        assert_eq!(step(&grid, p, Action::Left), Position::new(0, 1));
    }

    #[test]
    fn test_bump_into_wall_and_edge() {
        let mut grid = GridWorld::new(4, 4);
        grid.set_cell(1, 0, CellKind::Wall);
        let corner = Position::new(0, 0);
        assert_eq!(step(&grid, corner, Action::Up), corner);
        assert_eq!(step(&grid, corner, Action::Left), corner);
        assert_eq!(step(&grid, corner, Action::Right), corner);
    }

    #[test]
    fn test_no_wind_keeps_action() {
        let model = TransitionModel::new(false);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(model.perturb(Action::Down, &mut rng), Action::Down);
        }
    }

    #[test]
    fn test_wind_only_turns_to_neighbours() {
        let model = TransitionModel::new(true);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..500 {
            let out = model.perturb(Action::Up, &mut rng);
            assert_ne!(out, Action::Down, "wind never reverses an action");
        }
    }
}
