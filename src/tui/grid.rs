use patchgrid::color::{hsv_to_rgb, Hsv};
use patchgrid::geometry::Anchors;
use patchgrid::shared::CellId;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use super::mode::{Projection, TuiState};
use super::scene::{CellVisual, SceneState};

// one glyph pair per pattern
const TEXTURES: [&str; 4] = ["██", "▓▓", "▒▒", "░░"];
const EMPTY: &str = "··";
const DIM: f32 = 0.35;

pub fn grey(level: f32) -> Color {
    let l = (level.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb(l, l, l)
}

fn cell_color(visual: &CellVisual) -> Color {
    let v = if visual.emission { DIM + (1.0 - DIM) * visual.brightness } else { DIM };
    let (r, g, b) = hsv_to_rgb(Hsv { h: visual.hue, s: 0.8, v }).to_u8();
    Color::Rgb(r, g, b)
}

// top-down view of the anchors, updates the projection used for clicks
pub fn draw_cell_grid(
    frame: &mut Frame,
    area: Rect,
    scene: &SceneState,
    anchors: &Anchors,
    selection: Option<CellId>,
    ts: &mut TuiState,
) {
    let bg = grey(scene.background);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let projection = Projection::new(inner, anchors);
    ts.projection = Some(projection);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // empty anchors in a grey that reads on both ends of the background
    let empty_fg = grey(if scene.background > 0.5 { 0.35 } else { 0.6 });
    let buf = frame.buffer_mut();
    for (cell, anchor) in anchors.iter() {
        let (text, style, at) = match scene.cell(cell) {
            Some(visual) => {
                let mut style = Style::default().fg(cell_color(visual)).bg(bg);
                if selection == Some(cell) {
                    style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
                }
                (TEXTURES[visual.texture as usize % TEXTURES.len()], style, visual.position)
            }
            None => (EMPTY, Style::default().fg(empty_fg).bg(bg), anchor.position),
        };
        let (x, y) = projection.to_screen(at);
        buf.set_string(x, y, text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchgrid::geometry::Vec3;

    fn visual(emission: bool, brightness: f32) -> CellVisual {
        CellVisual {
            position: Vec3::default(),
            emission,
            brightness,
            hue: 0.0,
            texture: 0,
        }
    }

    #[test]
    fn lit_cells_are_brighter() {
        let Color::Rgb(dark, _, _) = cell_color(&visual(false, 1.0)) else { panic!() };
        let Color::Rgb(lit, _, _) = cell_color(&visual(true, 1.0)) else { panic!() };
        assert!(lit > dark);
        assert_eq!(cell_color(&visual(true, 0.0)), cell_color(&visual(false, 0.0)));
    }

    #[test]
    fn grey_clamps() {
        assert_eq!(grey(-1.0), Color::Rgb(0, 0, 0));
        assert_eq!(grey(2.0), Color::Rgb(255, 255, 255));
    }
}
