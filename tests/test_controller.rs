//! Tests for the tick loop and its bookkeeping.

use glow_lab::simulation::params::{CUMULATIVE_TRACE_LEN, REWARD_TRACE_LEN};
use glow_lab::simulation::{
    CellKind, EpisodeController, GridWorld, LabConfig, Params, Position, Preset, RunState,
};

fn lab_with(preset: Preset, params: Params, seed: u64) -> EpisodeController {
    EpisodeController::new(LabConfig {
        width: 5,
        height: 5,
        preset,
        params,
        seed: Some(seed),
    })
}

#[test]
fn test_cumulative_return_equals_sum_of_rewards() {
    let mut lab = lab_with(Preset::Open, Params::default(), 3);
    let mut sum = 0.0;
    for _ in 0..5_000 {
        sum += lab.step().reward;
    }
    assert!(
        (lab.total_return() - sum).abs() < 1e-9,
        "counter {} vs sum {sum}",
        lab.total_return()
    );
    assert_eq!(lab.t(), 5_000);
}

#[test]
fn test_episode_returns_match_rewards_since_last_terminal() {
    let mut lab = lab_with(Preset::Open, Params::default(), 11);
    let mut running = 0.0;
    let mut expected = Vec::new();

    for _ in 0..5_000 {
        let out = lab.step();
        running += out.reward;
        if let Some(finished) = out.finished {
            expected.push(running);
            assert!((finished.ret - running).abs() < 1e-9);
            running = 0.0;
        }
    }

    let series = lab.episode_returns();
    assert!(!series.is_empty(), "a 5x5 random walk should end some episodes");
    assert_eq!(series.len(), expected.len());
    for (k, (entry, want)) in series.iter().zip(&expected).enumerate() {
        assert_eq!(entry.episode, k as u64 + 1);
        assert!((entry.ret - want).abs() < 1e-9, "episode {}", k + 1);
    }
    assert_eq!(lab.episode(), series.len() as u64 + 1);
    assert!((lab.episode_return() - running).abs() < 1e-9);
}

#[test]
fn test_terminal_tick_respawns_and_clears_glow() {
    // Goal right next to the start
    let mut grid = GridWorld::new(4, 4);
    grid.set_cell(0, 3, CellKind::Start);
    grid.set_cell(1, 3, CellKind::Goal);
    grid.set_cell(0, 2, CellKind::Goal);
    let params = Params {
        epsilon: 0.0,
        ..Params::default()
    };
    let mut lab = EpisodeController::with_grid(grid, params, Some(5));
    // Down and Left bump into the edge and leave glow behind
    for _ in 0..200 {
        let out = lab.step();
        if out.is_terminal() {
            assert_eq!(lab.agent(), Position::new(0, 3));
            assert!(lab.memory().total_glow().abs() < 1e-12);
            assert!(lab.grid().is_terminal(out.to.x, out.to.y));
            return;
        }
        assert!(lab.memory().total_glow() > 0.0);
    }
    panic!("agent never reached an adjacent goal");
}

#[test]
fn test_glow_decays_before_new_glow() {
    let mut grid = GridWorld::new(6, 6);
    grid.set_cell(0, 5, CellKind::Start);
    let params = Params {
        eta: 0.5,
        ..Params::default()
    };
    let mut lab = EpisodeController::with_grid(grid, params, Some(1));
    lab.step();
    let total_after_one = lab.memory().total_glow();
    lab.step();
    // 1 * (1 - η) + 1
    assert!((total_after_one - 1.0).abs() < 1e-12);
    assert!((lab.memory().total_glow() - 1.5).abs() < 1e-12);
}

#[test]
fn test_trace_buffers_are_bounded() {
    let mut lab = lab_with(Preset::Open, Params::default(), 21);
    for _ in 0..(CUMULATIVE_TRACE_LEN + 250) {
        lab.step();
    }
    let snap = lab.observe();
    assert_eq!(snap.reward_trace.len(), REWARD_TRACE_LEN);
    assert_eq!(snap.cumulative_trace.len(), CUMULATIVE_TRACE_LEN);
    assert_eq!(snap.reward_trace.last().map(|p| p.t), Some(snap.t));
    assert_eq!(snap.cumulative_trace.first().map(|p| p.t), Some(251));
    let last_total = snap.cumulative_trace.last().map(|p| p.total);
    assert_eq!(last_total, Some(snap.total_return));
}

#[test]
fn test_full_reset_restores_initial_state() {
    let mut lab = lab_with(Preset::TwoRooms, Params::default(), 4);
    for _ in 0..3_000 {
        lab.step();
    }
    lab.reset();

    let snap = lab.observe();
    assert_eq!(snap.t, 0);
    assert_eq!(snap.episode, 1);
    assert_eq!(snap.total_return, 0.0);
    assert_eq!(snap.episode_return, 0.0);
    assert!(snap.reward_trace.is_empty());
    assert!(snap.cumulative_trace.is_empty());
    assert!(snap.episode_returns.is_empty());
    assert_eq!(snap.agent, snap.spawn);
    assert!(snap.memory.h_values().iter().all(|&h| h == 1.0));
    assert!(snap.memory.g_values().iter().all(|&g| g == 0.0));
    // The layout survives a reset
    assert_eq!(snap.grid, GridWorld::from_preset(5, 5, Preset::TwoRooms));
}

#[test]
fn test_reconfigure_clamps_and_regenerates() {
    let mut lab = lab_with(Preset::Open, Params::default(), 4);
    lab.reconfigure(100, 1, Preset::Corridor);
    assert_eq!(lab.grid().width(), 30);
    assert_eq!(lab.grid().height(), 4);
    assert_eq!(lab.memory().dimensions(), (30, 4));
    assert_eq!(lab.preset(), Preset::Corridor);
    assert_eq!(lab.agent(), Position::new(0, 3));
}

#[test]
fn test_params_are_clamped_at_the_boundary() {
    let mut lab = lab_with(Preset::Open, Params::default(), 4);
    lab.set_params(Params {
        tau: 0.0,
        epsilon: 3.0,
        gamma: -1.0,
        ..Params::default()
    });
    assert_eq!(lab.params().tau, 0.05);
    assert_eq!(lab.params().epsilon, 1.0);
    assert_eq!(lab.params().gamma, 0.01);
}

#[test]
fn test_run_state_toggle() {
    let mut lab = lab_with(Preset::Open, Params::default(), 4);
    assert_eq!(lab.run_state(), RunState::Running);
    assert!(lab.tick().is_some());
    assert_eq!(lab.toggle_running(), RunState::Paused);
    assert!(lab.tick().is_none());
    assert_eq!(lab.t(), 1);
    lab.set_running(true);
    assert!(lab.tick().is_some());
}

#[test]
fn test_edits_apply_while_running() {
    let mut lab = lab_with(Preset::Open, Params::default(), 9);
    for _ in 0..10 {
        lab.step();
    }
    // Wall off the agent completely; it can no longer move
    let Position { x, y } = lab.agent();
    for (dx, dy) in [(0isize, -1isize), (1, 0), (0, 1), (-1, 0)] {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx >= 0 && ny >= 0 {
            lab.set_cell(nx as usize, ny as usize, CellKind::Wall);
        }
    }
    let here = lab.agent();
    for _ in 0..50 {
        let out = lab.step();
        assert_eq!(out.to, here);
        assert!(!out.is_terminal());
    }
    assert_eq!(lab.pick_cell(here.x, here.y).map(|k| k != CellKind::Wall), Some(true));
}

#[test]
fn test_custom_grid_is_fitted_to_size_bounds() {
    let mut lab = EpisodeController::with_grid(GridWorld::new(0, 0), Params::default(), Some(6));
    assert_eq!((lab.grid().width(), lab.grid().height()), (4, 4));
    assert_eq!(lab.memory().dimensions(), (4, 4));
    assert_eq!(lab.agent(), Position::new(0, 3));
    for _ in 0..100 {
        lab.step();
    }
    assert_eq!(lab.t(), 100);

    let mut wide = GridWorld::new(40, 3);
    wide.set_cell(2, 1, CellKind::Goal);
    wide.set_cell(35, 0, CellKind::Lava);
    let lab = EpisodeController::with_grid(wide, Params::default(), Some(6));
    assert_eq!((lab.grid().width(), lab.grid().height()), (30, 4));
    assert_eq!(lab.pick_cell(2, 1), Some(CellKind::Goal));
    assert_eq!(lab.grid().count(CellKind::Lava), 0);
}
