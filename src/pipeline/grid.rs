// The 4x16 patch grid that `SequencerGrid` mutates.
//
// "slot": a column, one time step of the sequence.
// "patch": an occupied cell, carries the pattern/pitch/gain sent to the engine.

use crate::shared::{CellId, NUM_CELLS};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub occupied: bool,
    pub pattern: u8, // sample/texture index, 0..4
    pub pitch: u8,   // pitch class, 0..7, C = 0
    pub gain: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            occupied: false,
            pattern: 0,
            pitch: 0,
            gain: 1.0,
        }
    }
}

impl Cell {
    // a fresh patch always starts at full gain, even where a patch was deleted before
    fn create(&mut self) {
        *self = Self { occupied: true, ..Self::default() };
    }

    // deleted cells keep gain 0 until recreated, so the engine silences them
    fn clear(&mut self) {
        *self = Self {
            occupied: false,
            pattern: 0,
            pitch: 0,
            gain: 0.0,
        };
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    cells: [Cell; NUM_CELLS],
    selection: Option<CellId>,
    patch_count: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cells: [Cell::default(); NUM_CELLS],
            selection: None,
            patch_count: 0,
        }
    }
}

impl Grid {
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub fn is_occupied(&self, id: CellId) -> bool {
        self.cell(id).occupied
    }

    pub fn selection(&self) -> Option<CellId> {
        self.selection
    }

    pub fn is_selected(&self, id: CellId) -> bool {
        self.selection == Some(id)
    }

    pub fn patch_count(&self) -> usize {
        self.patch_count
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        CellId::all().filter(|&id| self.is_occupied(id))
    }

    /// Returns false (and changes nothing) if the cell is already a patch.
    pub fn create(&mut self, id: CellId) -> bool {
        let cell = &mut self.cells[id.index()];
        if cell.occupied {
            return false;
        }
        cell.create();
        self.patch_count += 1;
        true
    }

    /// Clears the selected patch and drops the selection.
    pub fn delete_selected(&mut self) -> Option<CellId> {
        let id = self.selection.take()?;
        self.cells[id.index()].clear();
        self.patch_count -= 1;
        Some(id)
    }

    /// Selects an occupied cell, returning the selection it replaced.
    pub fn select(&mut self, id: CellId) -> Option<CellId> {
        debug_assert!(self.is_occupied(id), "selecting empty cell {id:?}");
        if !self.is_occupied(id) {
            return self.selection;
        }
        self.selection.replace(id)
    }

    pub fn deselect(&mut self) -> Option<CellId> {
        self.selection.take()
    }

    /// Mutable access to the selected patch, if any.
    pub fn selected_mut(&mut self) -> Option<(CellId, &mut Cell)> {
        let id = self.selection?;
        Some((id, &mut self.cells[id.index()]))
    }
}
