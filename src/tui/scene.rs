// What the grid has told us to draw. The model pushes changes in through
// `PresentationSink`; the view reads this every frame.

use patchgrid::geometry::{Orientation, Vec3};
use patchgrid::presentation::PresentationSink;
use patchgrid::shared::{CellId, NUM_CELLS};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellVisual {
    pub position: Vec3,
    pub emission: bool,
    pub brightness: f32,
    pub hue: f32,
    pub texture: u8,
}

#[derive(Clone, Debug)]
pub struct SceneState {
    pub cells: [Option<CellVisual>; NUM_CELLS],
    pub particle_rate: f32,
    pub background: f32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            cells: [None; NUM_CELLS],
            particle_rate: 0.0,
            background: 0.0,
        }
    }
}

impl SceneState {
    pub fn cell(&self, cell: CellId) -> Option<&CellVisual> {
        self.cells[cell.index()].as_ref()
    }

    fn cell_mut(&mut self, cell: CellId) -> Option<&mut CellVisual> {
        self.cells[cell.index()].as_mut()
    }
}

impl PresentationSink for SceneState {
    // glyphs are drawn top-down, so the heading has nothing to turn
    fn materialize(&mut self, cell: CellId, position: Vec3, _orientation: Orientation) {
        self.cells[cell.index()] = Some(CellVisual {
            position,
            emission: false,
            brightness: 0.0,
            hue: 0.0,
            texture: 0,
        });
    }

    fn remove(&mut self, cell: CellId) {
        self.cells[cell.index()] = None;
    }

    fn set_emission(&mut self, cell: CellId, on: bool) {
        if let Some(c) = self.cell_mut(cell) {
            c.emission = on;
        }
    }

    fn set_emission_brightness(&mut self, cell: CellId, value: f32) {
        if let Some(c) = self.cell_mut(cell) {
            c.brightness = value.clamp(0.0, 1.0);
        }
    }

    fn set_base_color(&mut self, cell: CellId, hue: f32) {
        if let Some(c) = self.cell_mut(cell) {
            c.hue = hue;
        }
    }

    fn set_texture(&mut self, cell: CellId, pattern: u8) {
        if let Some(c) = self.cell_mut(cell) {
            c.texture = pattern;
        }
    }

    fn set_particle_rate(&mut self, rate: f32) {
        self.particle_rate = rate;
    }

    fn set_background(&mut self, level: f32) {
        self.background = level;
    }
}
