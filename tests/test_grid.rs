//! Tests for grid layouts, rewards and terminal cells.

use glow_lab::simulation::grid::RewardTable;
use glow_lab::simulation::params::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, WALL_PENALTY};
use glow_lab::simulation::{CellKind, GridWorld, Position, Preset};

fn table() -> RewardTable {
    RewardTable {
        step_cost: -0.05,
        goal_reward: 3.0,
        lava_penalty: -2.0,
    }
}

#[test]
fn test_presets_are_deterministic() {
    for preset in Preset::ALL {
        let a = GridWorld::from_preset(11, 9, preset);
        let b = GridWorld::from_preset(11, 9, preset);
        assert_eq!(a, b, "{preset} should regenerate identically");
    }
}

#[test]
fn test_every_preset_has_start_and_goal_at_all_sizes() {
    for preset in Preset::ALL {
        for w in MIN_WIDTH..=MAX_WIDTH {
            for h in MIN_HEIGHT..=MAX_HEIGHT {
                let grid = GridWorld::from_preset(w, h, preset);
                assert_eq!(grid.count(CellKind::Start), 1, "{preset} {w}x{h}");
                assert_eq!(grid.count(CellKind::Goal), 1, "{preset} {w}x{h}");
            }
        }
    }
}

#[test]
fn test_corridor_layout() {
    let grid = GridWorld::from_preset(8, 6, Preset::Corridor);
    let lane = 3;
    for x in 1..7 {
        assert_eq!(grid.cell(x, lane), Some(CellKind::Empty));
        assert_eq!(grid.cell(x, 1), Some(CellKind::Wall));
    }
    assert_eq!(grid.cell(7, lane), Some(CellKind::Goal));
    assert_eq!(grid.default_start(), Position::new(0, 5));
}

#[test]
fn test_two_rooms_layout() {
    let grid = GridWorld::from_preset(10, 8, Preset::TwoRooms);
    for y in 0..8 {
        let expected = if y == 4 { CellKind::Empty } else { CellKind::Wall };
        assert_eq!(grid.cell(5, y), Some(expected), "divider row {y}");
    }
    assert_eq!(grid.cell(8, 0), Some(CellKind::Goal));
    assert_eq!(grid.cell(2, 6), Some(CellKind::Lava));
    assert_eq!(grid.default_start(), Position::new(1, 7));
}

#[test]
fn test_maze_rows_have_single_gap() {
    let grid = GridWorld::from_preset(9, 9, Preset::Maze);
    for y in (1..8).step_by(2) {
        let gaps: Vec<usize> = (1..8)
            .filter(|&x| grid.cell(x, y) == Some(CellKind::Empty))
            .collect();
        assert_eq!(gaps, vec![1 + (y * 3) % 7], "row {y}");
    }
    assert_eq!(grid.cell(8, 0), Some(CellKind::Goal));
}

#[test]
fn test_terminal_cells() {
    let grid = GridWorld::from_preset(5, 5, Preset::Open);
    assert!(grid.is_terminal(4, 0));
    assert!(grid.is_terminal(3, 4));
    assert!(!grid.is_terminal(0, 4));
    assert!(!grid.is_terminal(2, 2));
    assert!(!grid.is_terminal(9, 9));
}

#[test]
fn test_reward_table_lookup() {
    let mut grid = GridWorld::from_preset(5, 5, Preset::Open);
    grid.set_cell(1, 1, CellKind::Wall);
    let t = table();
    assert_eq!(grid.reward(4, 0, &t), 3.0);
    assert_eq!(grid.reward(3, 4, &t), -2.0);
    assert_eq!(grid.reward(1, 1, &t), WALL_PENALTY);
    assert_eq!(grid.reward(0, 4, &t), -0.05);
    assert_eq!(grid.reward(2, 2, &t), -0.05);
}

#[test]
fn test_multiple_starts_are_permitted() {
    let mut grid = GridWorld::from_preset(6, 6, Preset::Open);
    grid.set_cell(3, 3, CellKind::Start);
    let starts: Vec<Position> = grid.starts().collect();
    assert_eq!(starts, vec![Position::new(3, 3), Position::new(0, 5)]);
}

#[test]
fn test_grid_without_start_falls_back_to_bottom_left() {
    let grid = GridWorld::new(7, 5);
    assert_eq!(grid.default_start(), Position::new(0, 4));
}
