use crate::geometry::{Orientation, Vec3};
use crate::shared::CellId;

/// Whatever draws the grid. The model pushes every visual change here and
/// never reads anything back.
pub trait PresentationSink {
    fn materialize(&mut self, cell: CellId, position: Vec3, orientation: Orientation);
    fn remove(&mut self, cell: CellId);
    fn set_emission(&mut self, cell: CellId, on: bool);
    /// `value` in 0..=1
    fn set_emission_brightness(&mut self, cell: CellId, value: f32);
    fn set_base_color(&mut self, cell: CellId, hue: f32);
    fn set_texture(&mut self, cell: CellId, pattern: u8);
    /// Background layer intensity.
    fn set_particle_rate(&mut self, rate: f32);
    /// Scene background grey level in 0..=1.
    fn set_background(&mut self, level: f32);
}
