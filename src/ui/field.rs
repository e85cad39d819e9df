use rayon::prelude::*;

use crate::simulation::grid::{CellKind, GridWorld, Position};
use crate::simulation::memory::MemoryField;
use crate::simulation::policy::Action;

/// Characters per grid cell on screen.
pub const CELL_WIDTH: usize = 2;

/// Glow intensity ramp for the memory inspector.
const GLOW_CHARS: [char; 4] = [' ', '.', ':', '*'];

fn cell_glyph(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Empty => ". ",
        CellKind::Wall => "##",
        CellKind::Goal => "G ",
        CellKind::Lava => "~~",
        CellKind::Start => "S ",
    }
}

/// Renders the world layout, one `String` per row, with the agent as `@`.
#[must_use]
pub fn compute_world_grid(grid: &GridWorld, agent: Position) -> Vec<String> {
    (0..grid.height())
        .into_par_iter()
        .map(|y| {
            let mut line = String::with_capacity(grid.width() * CELL_WIDTH);
            for x in 0..grid.width() {
                if agent == Position::new(x, y) {
                    line.push_str("@ ");
                } else {
                    line.push_str(cell_glyph(grid.cell(x, y).unwrap_or_default()));
                }
            }
            line
        })
        .collect()
}

/// Renders the memory field: the preferred direction of each cell followed
/// by a glow marker. Cells whose h-values are all equal show `+`.
#[must_use]
pub fn compute_policy_grid(grid: &GridWorld, memory: &MemoryField) -> Vec<String> {
    (0..grid.height())
        .into_par_iter()
        .map(|y| {
            let mut line = String::with_capacity(grid.width() * CELL_WIDTH * 3);
            for x in 0..grid.width() {
                match grid.cell(x, y).unwrap_or_default() {
                    CellKind::Wall => line.push_str("##"),
                    CellKind::Goal => line.push_str("G "),
                    CellKind::Lava => line.push_str("~~"),
                    CellKind::Empty | CellKind::Start => {
                        line.push(preferred_arrow(memory, x, y));
                        line.push(glow_char(memory.max_glow(x, y)));
                    }
                }
            }
            line
        })
        .collect()
}

#[allow(clippy::float_cmp)]
fn preferred_arrow(memory: &MemoryField, x: usize, y: usize) -> char {
    let hs = memory.h_row(x, y);
    let max = hs.iter().copied().fold(f64::MIN, f64::max);
    let min = hs.iter().copied().fold(f64::MAX, f64::min);
    if max - min < 1e-9 {
        return '+';
    }
    let best = hs.iter().position(|&h| h == max).unwrap_or(0);
    Action::from_index(best).arrow()
}

fn glow_char(glow: f64) -> char {
    // Glow is bounded by 5; most of the visible range sits below 2.
    let idx = ((glow / 2.0) * (GLOW_CHARS.len() - 1) as f64).ceil() as usize;
    GLOW_CHARS[idx.min(GLOW_CHARS.len() - 1)]
}

/// Maps a series onto `0..=100` for sparkline display.
#[must_use]
pub fn scale_series(values: &[f64]) -> Vec<u64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            if span > 0.0 {
                ((v - min) / span * 100.0).round() as u64
            } else {
                50
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glow_char_ramp() {
        assert_eq!(glow_char(0.0), ' ');
        assert_eq!(glow_char(0.3), '.');
        assert_eq!(glow_char(5.0), '*');
    }

    #[test]
    fn test_scale_series_flat() {
        assert_eq!(scale_series(&[2.0, 2.0]), vec![50, 50]);
        assert!(scale_series(&[]).is_empty());
    }

    #[test]
    fn test_scale_series_span() {
        assert_eq!(scale_series(&[-1.0, 0.0, 1.0]), vec![0, 50, 100]);
    }
}
