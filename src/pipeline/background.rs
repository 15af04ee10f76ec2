use crate::color::{inverse_lerp, lerp};
use crate::shared::NUM_CELLS;

// fraction of the blend after which the level snaps onto the target
const SNAP_AT: f32 = 0.95;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackgroundMode {
    /// Grey level follows the patch count.
    #[default]
    Auto,
    White,
    Black,
}

impl BackgroundMode {
    pub fn next(self) -> Self {
        match self {
            BackgroundMode::Auto => BackgroundMode::White,
            BackgroundMode::White => BackgroundMode::Black,
            BackgroundMode::Black => BackgroundMode::Auto,
        }
    }
}

/// Scene background brightness. In `Auto` mode a patch-count change blends
/// from the current level to the new target over one second.
#[derive(Clone, Debug, Default)]
pub struct Background {
    mode: BackgroundMode,
    from: f32,
    target: f32,
    level: f32,
    blend: f32,
}

impl Background {
    pub fn mode(&self) -> BackgroundMode {
        self.mode
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    pub fn on_patch_count(&mut self, patch_count: usize) {
        self.from = self.level;
        self.target = inverse_lerp(0.0, NUM_CELLS as f32, patch_count as f32);
        self.blend = 0.0;
    }

    pub fn advance(&mut self, dt: f32) {
        if self.level == self.target {
            return;
        }
        self.blend = (self.blend + dt).min(1.0);
        self.level = if self.blend > SNAP_AT {
            self.target
        } else {
            lerp(self.from, self.target, self.blend)
        };
    }

    pub fn level(&self) -> f32 {
        match self.mode {
            BackgroundMode::Auto => self.level,
            BackgroundMode::White => 1.0,
            BackgroundMode::Black => 0.0,
        }
    }
}
