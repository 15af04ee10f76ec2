use patchgrid::geometry::{Anchors, Vec3};
use ratatui::layout::Rect;

// glyph width of one drawn cell
pub const CELL_W: u16 = 2;

/// Top-down mapping between the scene's x/z plane and a screen area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub area: Rect,
    min_x: f32,
    min_z: f32,
    span_x: f32,
    span_z: f32,
}

impl Projection {
    pub fn new(area: Rect, anchors: &Anchors) -> Self {
        let (x0, z0, x1, z1) = anchors.bounds_xz();
        Self {
            area,
            min_x: x0,
            min_z: z0,
            span_x: x1 - x0,
            span_z: z1 - z0,
        }
    }

    fn usable(&self) -> (f32, f32) {
        (
            self.area.width.saturating_sub(CELL_W) as f32,
            self.area.height.saturating_sub(1) as f32,
        )
    }

    /// Screen cell where the glyph for `p` starts.
    pub fn to_screen(&self, p: Vec3) -> (u16, u16) {
        let (w, h) = self.usable();
        let u = if self.span_x > 0.0 { (p.x - self.min_x) / self.span_x } else { 0.5 };
        let v = if self.span_z > 0.0 { (p.z - self.min_z) / self.span_z } else { 0.5 };
        (
            self.area.x + (u.clamp(0.0, 1.0) * w).round() as u16,
            self.area.y + (v.clamp(0.0, 1.0) * h).round() as u16,
        )
    }

    /// Scene point under a screen cell, `None` outside the area.
    pub fn to_world(&self, column: u16, row: u16) -> Option<Vec3> {
        let a = self.area;
        if column < a.x || column >= a.x + a.width || row < a.y || row >= a.y + a.height {
            return None;
        }
        let (w, h) = self.usable();
        // clicks land on the middle of a glyph
        let dx = (column - a.x) as f32 - (CELL_W as f32 - 1.0) / 2.0;
        let u = if w > 0.0 { (dx / w).clamp(0.0, 1.0) } else { 0.5 };
        let v = if h > 0.0 { (row - a.y) as f32 / h } else { 0.5 };
        Some(Vec3::new(
            self.min_x + u * self.span_x,
            0.0,
            self.min_z + v * self.span_z,
        ))
    }
}

// state local to the tui; the projection is refreshed by every render
#[derive(Clone, Debug, Default)]
pub struct TuiState {
    pub projection: Option<Projection>,
    pub show_help: bool,
}
