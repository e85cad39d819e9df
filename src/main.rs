#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use glow_lab::simulation::{
    params::tick_interval, EpisodeController, LabConfig, Preset,
};
use glow_lab::ui::{command_for, render::draw_ui, DashboardState};

/// Grid-world sandbox for a glow-trace learning agent.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Grid width (4-30)
    #[arg(long)]
    width: Option<usize>,
    /// Grid height (4-22)
    #[arg(long)]
    height: Option<usize>,
    /// Layout preset: open, corridor, two-rooms, maze
    #[arg(long)]
    preset: Option<Preset>,
    /// Ticks per second (1-40)
    #[arg(long)]
    rate: Option<f64>,
    /// Enable wind
    #[arg(long)]
    wind: bool,
    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Write logs to this file (the terminal UI otherwise discards them)
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Run without the terminal UI and print a JSON summary
    #[arg(long)]
    headless: bool,
    /// Number of ticks in headless mode
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;
    let config = build_config(&args)?;
    info!(?config, "starting lab");

    let mut lab = EpisodeController::new(config);
    if args.headless {
        return run_headless(&mut lab, args.ticks);
    }

    // Setup Terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut lab);

    // Restore Terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.headless {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    } else if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<LabConfig> {
    let mut config = match &args.config {
        Some(path) => LabConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LabConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if let Some(rate) = args.rate {
        config.params.tick_rate = rate;
    }
    if args.wind {
        config.params.wind = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config.clamped())
}

fn run_headless(lab: &mut EpisodeController, ticks: u64) -> Result<()> {
    let started = Instant::now();
    for _ in 0..ticks {
        lab.step();
    }
    let summary = lab.observe().summary();
    info!(
        ticks,
        episodes = summary.episodes_completed,
        elapsed_ms = started.elapsed().as_millis(),
        "headless run finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    lab: &mut EpisodeController,
) -> io::Result<()> {
    let mut dashboard = DashboardState::new(lab);
    let mut last_tick = Instant::now();
    loop {
        let tick_rate = tick_interval(lab.params().tick_rate);

        // 1. Update
        if last_tick.elapsed() >= tick_rate {
            if lab.tick().is_some() {
                dashboard.refresh(lab);
            }
            last_tick = Instant::now();
        }

        // 2. Render
        terminal.draw(|f| draw_ui(f, &dashboard))?;

        // 3. Input
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = command_for(key.code) {
                    if !dashboard.apply(cmd, lab) {
                        return Ok(());
                    }
                }
            }
        }
    }
}
