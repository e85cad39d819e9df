use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Sparkline, Wrap},
    Frame,
};

use crate::simulation::grid::Position;
use crate::ui::dashboard::DashboardState;
use crate::ui::field::{compute_policy_grid, compute_world_grid, scale_series, CELL_WIDTH};

pub fn draw_ui(f: &mut Frame, state: &DashboardState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // HUD
            Constraint::Min(0),    // Panels
            Constraint::Length(1), // Cell inspector
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    let hud = Paragraph::new(Span::styled(
        state.hud_line(),
        Style::default().add_modifier(Modifier::REVERSED),
    ))
    .wrap(Wrap { trim: true });
    f.render_widget(hud, rows[0]);

    let grid = &state.snapshot.grid;
    let panel_width = (grid.width() * CELL_WIDTH + 2) as u16;
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(panel_width),
            Constraint::Length(panel_width),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    let world = compute_world_grid(grid, state.snapshot.agent);
    draw_cells(f, panels[0], "World", world, state.cursor);

    let policy = compute_policy_grid(grid, &state.snapshot.memory);
    draw_cells(f, panels[1], "Memory", policy, state.cursor);

    draw_traces(f, panels[2], state);

    f.render_widget(Paragraph::new(state.inspect_line()), rows[2]);
    f.render_widget(
        Paragraph::new(Span::styled(
            state.status.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
        rows[3],
    );
}

fn cell_style(cell: &str) -> Style {
    match cell.chars().next() {
        Some('#') => Style::default().fg(Color::DarkGray),
        Some('G') => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Some('~') => Style::default().fg(Color::Red),
        Some('S') => Style::default().fg(Color::Cyan),
        Some('@') => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::White),
    }
}

/// Splits a rendered row into per-cell spans so the cursor cell can be highlighted.
fn styled_row(row: &str, y: usize, cursor: Position) -> Line<'static> {
    let chars: Vec<char> = row.chars().collect();
    let spans: Vec<Span<'static>> = chars
        .chunks(CELL_WIDTH)
        .enumerate()
        .map(|(x, cell)| {
            let text: String = cell.iter().collect();
            let mut style = cell_style(&text);
            if cursor == Position::new(x, y) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Span::styled(text, style)
        })
        .collect();
    Line::from(spans)
}

fn draw_cells(f: &mut Frame, area: Rect, title: &str, rows: Vec<String>, cursor: Position) {
    let text: Vec<Line> = rows
        .iter()
        .enumerate()
        .map(|(y, row)| styled_row(row, y, cursor))
        .collect();

    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(Style::default().bg(Color::Black));
    f.render_widget(panel, area);
}

fn draw_traces(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let s = &state.snapshot;
    let rewards: Vec<f64> = s.reward_trace.iter().map(|p| p.reward).collect();
    let cumulative: Vec<f64> = s.cumulative_trace.iter().map(|p| p.total).collect();
    let returns: Vec<f64> = s.episode_returns.iter().map(|e| e.ret).collect();

    let last = |v: &[f64]| v.last().map_or_else(|| String::from("-"), |x| format!("{x:.2}"));
    let series = [
        (format!("Reward R (last {})", last(&rewards)), rewards, Color::Blue),
        (
            format!("Cumulative C ({})", last(&cumulative)),
            cumulative,
            Color::Magenta,
        ),
        (
            format!("Episode return G ({} episodes)", returns.len()),
            returns,
            Color::Green,
        ),
    ];

    for (chunk, (title, values, color)) in chunks.iter().zip(series) {
        let data = scale_series(&values);
        // Keep the newest points when the panel is narrower than the series.
        let visible = usize::from(chunk.width.saturating_sub(2));
        let tail = &data[data.len().saturating_sub(visible)..];
        let spark = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .data(tail)
            .max(100)
            .style(Style::default().fg(color));
        f.render_widget(spark, *chunk);
    }
}
