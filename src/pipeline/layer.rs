// Background layer: an audio drone plus particle effect whose intensity
// follows the number of patches on the grid.

const FLAT_RATE_COUNT: usize = 8;
const FLAT_RATE: f32 = 15.0;
const START_COUNT: usize = 9;

/// Particle rate for a given patch count while the layer is on.
pub fn particle_rate(patch_count: usize) -> f32 {
    match patch_count {
        n if n < FLAT_RATE_COUNT => 0.0,
        FLAT_RATE_COUNT => FLAT_RATE,
        n => 0.4 * (n * n) as f32,
    }
}

/// What the model should push after a layer change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerUpdate {
    pub patch_count: usize, // effective count for the engine, 0 when off
    pub start: bool,        // send the start before the edit
    pub rate: f32,
}

#[derive(Clone, Debug)]
pub struct LayerState {
    active: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self { active: true }
    }
}

impl LayerState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn effective_count(&self, patch_count: usize) -> usize {
        if self.active { patch_count } else { 0 }
    }

    /// Called after every create/delete. Nothing to push while the layer is off.
    /// Every upward crossing of nine patches restarts the layer.
    pub fn on_patch_count(&self, previous: usize, patch_count: usize) -> Option<LayerUpdate> {
        if !self.active {
            return None;
        }
        let start = previous < START_COUNT && patch_count >= START_COUNT;
        Some(LayerUpdate {
            patch_count,
            start,
            rate: particle_rate(patch_count),
        })
    }

    pub fn toggle(&mut self, patch_count: usize) -> LayerUpdate {
        self.active = !self.active;
        LayerUpdate {
            patch_count: self.effective_count(patch_count),
            start: false,
            rate: if self.active { particle_rate(patch_count) } else { 0.0 },
        }
    }
}
