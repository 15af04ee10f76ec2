// Input plan (resolved by the tui, dispatched by `SequencerGrid::handle_input`):
//
// Pointer:
//   left click     //  Pointer(world position under the cursor)
//
// Pitch keys (C major, C = 0):
//   c d e f g a b  //  SetPitch(0 or ... or 6)
//
// Pattern keys:
//   1 2 3 4        //  SetPattern(0 or ... or 3)
//
// Everything else:
//   Backspace      //  DeletePatch
//   l              //  ToggleLayer
//   i              //  CycleBackground
//   Esc            //  Quit

use crate::geometry::Vec3;

pub const ROWS: usize = 4;
pub const COLS: usize = 16;
pub const NUM_CELLS: usize = ROWS * COLS;
pub const NUM_PITCHES: usize = 7;
pub const NUM_PATTERNS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub const fn new(row: usize, col: usize) -> Self {
        debug_assert!(row < ROWS && col < COLS, "cell outside the 4x16 grid");
        Self { row, col }
    }

    pub fn is_on_grid(self) -> bool {
        self.row < ROWS && self.col < COLS
    }

    // row-major index into flat per-cell arrays
    pub fn index(self) -> usize {
        self.row * COLS + self.col
    }

    pub fn from_index(index: usize) -> Self {
        Self { row: index / COLS, col: index % COLS }
    }

    pub fn all() -> impl Iterator<Item = CellId> {
        (0..NUM_CELLS).map(CellId::from_index)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Pointer(Vec3),
    SetPitch(u8),   // 0-6
    SetPattern(u8), // 0-3
    DeletePatch,
    ToggleLayer,
    CycleBackground,
    Quit,
}
