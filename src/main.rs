mod audio;
mod loader;
mod tui;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use patchgrid::config;
use patchgrid::{InputEvent, SequencerGrid};

use audio::{AudioHandle, EngineSettings};
use tui::scene::SceneState;

type Grid = SequencerGrid<AudioHandle, SceneState>;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("patchgrid=info")).init();

    let project_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config = config::load_or_init(&project_dir)?;
    log::info!("project {} ({:?} layout, {} bpm)", project_dir.display(), config.layout, config.bpm);

    let sample_dir = config.sample_dir(&project_dir);
    let settings = EngineSettings {
        bpm: config.bpm,
        steps_per_beat: config.steps_per_beat,
        master_gain: config.master_gain,
    };
    let audio = audio::start_audio(&settings, |rate| {
        loader::sample_loader::load_pattern_samples(&sample_dir, rate)
    })?;
    let mut grid = SequencerGrid::new(config.anchors(), audio, SceneState::default());

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    // logging to a terminal stderr would draw over the ui
    let prev_log_level = log::max_level();
    if io::stderr().is_terminal() {
        log::set_max_level(log::LevelFilter::Off);
    }
    let result = event_loop(&mut term, &mut grid);
    log::set_max_level(prev_log_level);
    result
}

fn event_loop(term: &mut Terminal<CrosstermBackend<io::Stdout>>, grid: &mut Grid) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut last_tick = Instant::now();
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let elapsed = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        grid.advance(elapsed);
        grid.sync();

        let status = tui::view::Status::from_grid(grid);
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), grid.sink(), grid.anchors(), &status, &mut tui_state);
        })?;

        for event in tui::input::poll_input(tick_rate, &mut tui_state)? {
            if event == InputEvent::Quit {
                return Ok(());
            }
            grid.handle_input(event);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
