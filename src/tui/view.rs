use patchgrid::audio_api::AudioBridge;
use patchgrid::geometry::Anchors;
use patchgrid::pipeline::background::BackgroundMode;
use patchgrid::pipeline::layer::particle_rate;
use patchgrid::presentation::PresentationSink;
use patchgrid::shared::{CellId, NUM_CELLS};
use patchgrid::SequencerGrid;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use super::grid::draw_cell_grid;
use super::mode::TuiState;
use super::scene::SceneState;

const PITCH_NAMES: [&str; 7] = ["C", "D", "E", "F", "G", "A", "B"];
const HELP: &str = "click: add/select  c-b: pitch  1-4: pattern  bksp: delete  l: layer  i: background  esc: quit";

/// Model state shown next to the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub patch_count: usize,
    pub selection: Option<(CellId, u8, u8)>, // cell, pitch, pattern
    pub layer_active: bool,
    pub background: BackgroundMode,
    pub slot: Option<usize>,
}

impl Status {
    pub fn from_grid<B: AudioBridge, P: PresentationSink>(g: &SequencerGrid<B, P>) -> Self {
        let grid = g.grid();
        Self {
            patch_count: grid.patch_count(),
            selection: grid.selection().map(|cell| {
                let c = grid.cell(cell);
                (cell, c.pitch, c.pattern)
            }),
            layer_active: g.layer().is_active(),
            background: g.background().mode(),
            slot: g.previous_slot(),
        }
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    scene: &SceneState,
    anchors: &Anchors,
    status: &Status,
    ts: &mut TuiState,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // status line
            Constraint::Min(8),    // scene
            Constraint::Length(3), // layer gauge
            Constraint::Length(if ts.show_help { 1 } else { 0 }),
        ])
        .split(area);

    draw_status(frame, sections[0], status);
    draw_cell_grid(frame, sections[1], scene, anchors, status.selection.map(|s| s.0), ts);
    draw_layer(frame, sections[2], scene, status);
    if ts.show_help {
        frame.render_widget(Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)), sections[3]);
    }
}

fn status_line(status: &Status) -> String {
    let selected = match status.selection {
        Some((cell, pitch, pattern)) => format!(
            "r{} s{:02}  {}  pattern {}",
            cell.row,
            cell.col,
            PITCH_NAMES.get(pitch as usize).unwrap_or(&"?"),
            pattern + 1
        ),
        None => "none".to_string(),
    };
    let slot = status.slot.map_or("--".to_string(), |s| format!("{s:02}"));
    format!(
        "slot {slot}  patches {}/{NUM_CELLS}  selected {selected}  bg {:?}",
        status.patch_count, status.background
    )
}

fn draw_status(frame: &mut Frame, area: Rect, status: &Status) {
    let block = Block::default().borders(Borders::ALL).title(" patchgrid ");
    frame.render_widget(Paragraph::new(Line::from(status_line(status))).block(block), area);
}

fn draw_layer(frame: &mut Frame, area: Rect, scene: &SceneState, status: &Status) {
    let max = particle_rate(NUM_CELLS);
    let ratio = if status.layer_active { (scene.particle_rate / max).clamp(0.0, 1.0) } else { 0.0 };
    let label = if status.layer_active {
        format!("{:.1}/s", scene.particle_rate)
    } else {
        "off".to_string()
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" layer "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio as f64)
        .label(label);
    frame.render_widget(gauge, area);
}
