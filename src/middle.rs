// The middle layer: owns the grid, turns input into grid edits, tells the
// audio engine about every edit and keeps the presentation in step with the
// playhead. Neither collaborator ever writes back into the grid.

use crate::audio_api::{AudioBridge, BridgeEvent, CellEdit};
use crate::color::{inverse_lerp, pitch_hue};
use crate::geometry::{Anchors, Vec3};
use crate::pipeline::background::Background;
use crate::pipeline::grid::Grid;
use crate::pipeline::layer::{LayerState, LayerUpdate};
use crate::presentation::PresentationSink;
use crate::shared::{CellId, InputEvent, COLS, NUM_PATTERNS, NUM_PITCHES, ROWS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    Created(CellId),
    Selected { cell: CellId, replaced: Option<CellId> },
    Deselected(CellId),
}

/// Emission brightness across one beat: full at the downbeat, fading to zero
/// at the end. A playhead of exactly zero means nothing has played yet.
pub fn fade_value(playhead: f32) -> f32 {
    if !playhead.is_finite() {
        return 0.0;
    }
    if playhead == 0.0 {
        return 1.0;
    }
    inverse_lerp(1.0, 0.0, playhead % 1.0)
}

pub struct SequencerGrid<B: AudioBridge, P: PresentationSink> {
    grid: Grid,
    layer: LayerState,
    background: Background,
    anchors: Anchors,
    previous_slot: Option<usize>,
    bridge: B,
    sink: P,
}

impl<B: AudioBridge, P: PresentationSink> SequencerGrid<B, P> {
    pub fn new(anchors: Anchors, bridge: B, sink: P) -> Self {
        Self {
            grid: Grid::default(),
            layer: LayerState::default(),
            background: Background::default(),
            anchors,
            previous_slot: None,
            bridge,
            sink,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn layer(&self) -> &LayerState {
        &self.layer
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn anchors(&self) -> &Anchors {
        &self.anchors
    }

    pub fn previous_slot(&self) -> Option<usize> {
        self.previous_slot
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer(pos) => {
                self.handle_pointer_at(pos);
            }
            InputEvent::SetPitch(pitch) => self.set_pitch(pitch),
            InputEvent::SetPattern(pattern) => self.set_pattern(pattern),
            InputEvent::DeletePatch => {
                self.delete_patch();
            }
            InputEvent::ToggleLayer => self.toggle_layer(),
            InputEvent::CycleBackground => self.cycle_background(),
            InputEvent::Quit => {} // handled by the caller
        }
    }

    pub fn handle_pointer_at(&mut self, pos: Vec3) -> ClickOutcome {
        let cell = self.anchors.nearest(pos);

        if !self.grid.is_occupied(cell) {
            self.create_patch(cell);
            return ClickOutcome::Created(cell);
        }

        // second click on the selection releases it
        if self.grid.is_selected(cell) {
            self.grid.deselect();
            self.unhighlight(cell);
            log::debug!("deselected {cell:?}");
            return ClickOutcome::Deselected(cell);
        }

        let replaced = self.grid.select(cell);
        self.highlight(cell);
        if let Some(prev) = replaced {
            self.unhighlight(prev);
        }
        log::debug!("selected {cell:?} (replacing {replaced:?})");
        ClickOutcome::Selected { cell, replaced }
    }

    /// Returns false if the cell already holds a patch or lies off the grid.
    pub fn create_patch(&mut self, cell: CellId) -> bool {
        if !cell.is_on_grid() {
            log::warn!("no cell at {cell:?}");
            return false;
        }
        let previous = self.grid.patch_count();
        if !self.grid.create(cell) {
            return false;
        }

        let anchor = self.anchors.get(cell);
        self.sink.materialize(cell, anchor.position, anchor.orientation);
        self.sink.set_base_color(cell, pitch_hue(0));
        self.sink.set_texture(cell, 0);

        self.send_edit(cell);
        log::debug!("created patch at {cell:?} ({} total)", self.grid.patch_count());
        self.on_patch_count_changed(previous);
        true
    }

    /// Deletes the selected patch, if there is one.
    pub fn delete_patch(&mut self) -> Option<CellId> {
        let previous = self.grid.patch_count();
        let cell = self.grid.delete_selected()?;

        self.unhighlight(cell);
        self.sink.remove(cell);

        // the engine sees gain 0 for the emptied cell
        self.send_edit(cell);
        log::debug!("deleted patch at {cell:?} ({} total)", self.grid.patch_count());
        self.on_patch_count_changed(previous);
        Some(cell)
    }

    pub fn set_pitch(&mut self, pitch: u8) {
        debug_assert!((pitch as usize) < NUM_PITCHES, "pitch {pitch} out of range");
        if pitch as usize >= NUM_PITCHES {
            return;
        }
        let Some((cell, patch)) = self.grid.selected_mut() else {
            return;
        };
        patch.pitch = pitch;

        self.send_edit(cell);
        self.sink.set_base_color(cell, pitch_hue(pitch));
    }

    pub fn set_pattern(&mut self, pattern: u8) {
        debug_assert!((pattern as usize) < NUM_PATTERNS, "pattern {pattern} out of range");
        if pattern as usize >= NUM_PATTERNS {
            return;
        }
        let Some((cell, patch)) = self.grid.selected_mut() else {
            return;
        };
        patch.pattern = pattern;

        self.send_edit(cell);
        self.sink.set_texture(cell, pattern);
    }

    pub fn toggle_layer(&mut self) {
        let update = self.layer.toggle(self.grid.patch_count());
        log::debug!("layer {}", if self.layer.is_active() { "on" } else { "off" });
        self.push_layer(update);
    }

    pub fn cycle_background(&mut self) {
        self.background.cycle_mode();
    }

    /// Advance time-based effects by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.background.advance(dt);
    }

    /// Reads the engine's playback position once and runs `tick` with it.
    pub fn sync(&mut self) {
        let snap = self.bridge.snapshot();
        self.tick(snap.current_slot, snap.playhead);
    }

    /// Per-frame visual sync against the playhead.
    pub fn tick(&mut self, current_slot: usize, playhead: f32) {
        self.sink.set_background(self.background.level());
        if current_slot >= COLS {
            log::warn!("engine reported slot {current_slot}, ignoring frame");
            return;
        }

        // glow and fade the playing column, except the selection
        let fade = fade_value(playhead);
        for row in 0..ROWS {
            let cell = CellId::new(row, current_slot);
            if !self.grid.is_selected(cell) && self.grid.is_occupied(cell) {
                self.sink.set_emission_brightness(cell, fade);
            }
        }

        if let Some(prev) = self.previous_slot.filter(|&p| p != current_slot) {
            for row in 0..ROWS {
                let cell = CellId::new(row, prev);
                if !self.grid.is_selected(cell) && self.grid.is_occupied(cell) {
                    self.sink.set_emission(cell, false);
                }
            }
        }

        for row in 0..ROWS {
            let cell = CellId::new(row, current_slot);
            if self.grid.is_occupied(cell) {
                self.sink.set_emission(cell, true);
            }
        }

        self.previous_slot = Some(current_slot);
    }

    fn send_edit(&mut self, cell: CellId) {
        let patch = self.grid.cell(cell);
        self.bridge.write_edit(CellEdit {
            cell,
            pattern: patch.pattern,
            pitch: patch.pitch,
            gain: patch.gain,
        });
        self.bridge.signal(BridgeEvent::EditHappened);
    }

    fn on_patch_count_changed(&mut self, previous: usize) {
        let count = self.grid.patch_count();
        self.background.on_patch_count(count);
        if let Some(update) = self.layer.on_patch_count(previous, count) {
            if update.start {
                log::info!("background layer started at {count} patches");
            }
            self.push_layer(update);
        }
    }

    fn push_layer(&mut self, update: LayerUpdate) {
        self.bridge.write_layer_patch_count(update.patch_count);
        if update.start {
            self.bridge.signal(BridgeEvent::StartLayer);
        }
        self.bridge.signal(BridgeEvent::EditLayer);
        self.sink.set_particle_rate(update.rate);
    }

    fn highlight(&mut self, cell: CellId) {
        self.sink.set_emission(cell, true);
        self.sink.set_emission_brightness(cell, 1.0);
    }

    fn unhighlight(&mut self, cell: CellId) {
        self.sink.set_emission(cell, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::grid::Cell;
    use crate::pipeline::test_fixture::{BridgeCall, RecordingBridge, RecordingSink, SinkCall};
    use pretty_assertions::assert_eq;

    type TestGrid = SequencerGrid<RecordingBridge, RecordingSink>;

    fn new_grid() -> TestGrid {
        SequencerGrid::new(Anchors::default(), RecordingBridge::default(), RecordingSink::default())
    }

    // default lanes layout puts cell (row, col) at x = col, z = row
    fn at(row: usize, col: usize) -> Vec3 {
        Vec3::new(col as f32, 0.0, row as f32)
    }

    fn click(g: &mut TestGrid, row: usize, col: usize) -> ClickOutcome {
        g.handle_pointer_at(at(row, col))
    }

    #[test]
    fn click_on_empty_cell_creates_patch() {
        let mut g = new_grid();
        assert_eq!(click(&mut g, 1, 3), ClickOutcome::Created(CellId::new(1, 3)));
        let cell = CellId::new(1, 3);
        assert_eq!(
            *g.grid().cell(cell),
            Cell { occupied: true, pattern: 0, pitch: 0, gain: 1.0 }
        );
        assert_eq!(g.grid().selection(), None);
        assert_eq!(
            g.bridge().calls[..2].to_vec(),
            vec![
                BridgeCall::Edit(CellEdit { cell, pattern: 0, pitch: 0, gain: 1.0 }),
                BridgeCall::Signal(BridgeEvent::EditHappened),
            ]
        );
        assert_eq!(
            g.sink().calls[0],
            SinkCall::Materialize(cell, at(1, 3), Default::default())
        );
    }

    #[test]
    fn create_then_delete_round_trip() {
        let mut g = new_grid();
        for cell in CellId::all() {
            g.handle_pointer_at(at(cell.row, cell.col));
            g.handle_pointer_at(at(cell.row, cell.col)); // select
            assert_eq!(g.delete_patch(), Some(cell));
            assert_eq!(
                *g.grid().cell(cell),
                Cell { occupied: false, pattern: 0, pitch: 0, gain: 0.0 }
            );
        }
        assert_eq!(g.grid().patch_count(), 0);
    }

    #[test]
    fn delete_sends_zero_gain_and_removes_cell() {
        let mut g = new_grid();
        let cell = CellId::new(2, 2);
        click(&mut g, 2, 2);
        click(&mut g, 2, 2);
        g.set_pitch(4);
        g.bridge_mut().take();
        g.sink_mut().take();

        g.delete_patch();
        assert_eq!(
            g.bridge().calls[..2].to_vec(),
            vec![
                BridgeCall::Edit(CellEdit { cell, pattern: 0, pitch: 0, gain: 0.0 }),
                BridgeCall::Signal(BridgeEvent::EditHappened),
            ]
        );
        assert!(g.sink().calls.contains(&SinkCall::Remove(cell)));
        assert_eq!(g.grid().selection(), None);
    }

    #[test]
    fn patch_count_tracks_occupied_cells() {
        let mut g = new_grid();
        let script = [(0, 0), (0, 1), (3, 15), (0, 0), (2, 7), (0, 1), (1, 1)];
        for (i, &(row, col)) in script.iter().enumerate() {
            click(&mut g, row, col);
            if i % 3 == 2 {
                g.delete_patch();
            }
            assert_eq!(g.grid().patch_count(), g.grid().occupied_cells().count());
        }
    }

    #[test]
    fn selecting_b_releases_a() {
        let mut g = new_grid();
        let a = CellId::new(0, 4);
        let b = CellId::new(3, 9);
        click(&mut g, 0, 4);
        click(&mut g, 3, 9);
        click(&mut g, 0, 4);
        assert_eq!(
            click(&mut g, 3, 9),
            ClickOutcome::Selected { cell: b, replaced: Some(a) }
        );
        assert!(g.grid().is_selected(b));
        assert!(!g.grid().is_selected(a));
        assert!(g.sink().calls.ends_with(&[
            SinkCall::Emission(b, true),
            SinkCall::Brightness(b, 1.0),
            SinkCall::Emission(a, false),
        ]));
    }

    #[test]
    fn second_click_deselects() {
        let mut g = new_grid();
        click(&mut g, 1, 1);
        click(&mut g, 1, 1);
        assert_eq!(click(&mut g, 1, 1), ClickOutcome::Deselected(CellId::new(1, 1)));
        assert_eq!(g.grid().selection(), None);
        // a third click selects again
        assert!(matches!(click(&mut g, 1, 1), ClickOutcome::Selected { .. }));
    }

    #[test]
    fn edits_without_selection_are_ignored() {
        let mut g = new_grid();
        click(&mut g, 0, 0);
        g.bridge_mut().take();
        g.sink_mut().take();

        g.set_pitch(3);
        g.set_pattern(2);
        assert_eq!(g.delete_patch(), None);
        assert!(g.bridge().calls.is_empty());
        assert!(g.sink().calls.is_empty());
        assert_eq!(g.grid().cell(CellId::new(0, 0)).pitch, 0);
    }

    #[test]
    fn pitch_and_pattern_edit_selected_patch() {
        let mut g = new_grid();
        let cell = CellId::new(2, 5);
        click(&mut g, 2, 5);
        click(&mut g, 2, 5);
        g.bridge_mut().take();
        g.sink_mut().take();

        g.set_pitch(6);
        g.set_pattern(3);
        assert_eq!(
            g.bridge().calls,
            vec![
                BridgeCall::Edit(CellEdit { cell, pattern: 0, pitch: 6, gain: 1.0 }),
                BridgeCall::Signal(BridgeEvent::EditHappened),
                BridgeCall::Edit(CellEdit { cell, pattern: 3, pitch: 6, gain: 1.0 }),
                BridgeCall::Signal(BridgeEvent::EditHappened),
            ]
        );
        assert_eq!(
            g.sink().calls,
            vec![SinkCall::BaseColor(cell, pitch_hue(6)), SinkCall::Texture(cell, 3)]
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    #[cfg(debug_assertions)]
    fn out_of_range_pitch_panics_in_debug() {
        let mut g = new_grid();
        g.set_pitch(7);
    }

    #[test]
    fn pointer_between_cells_is_deterministic() {
        let mut g = new_grid();
        // equidistant from (0, 0) and (0, 1)
        let between = Vec3::new(0.5, 0.0, 0.0);
        assert_eq!(g.handle_pointer_at(between), ClickOutcome::Created(CellId::new(0, 0)));
        for _ in 0..5 {
            let outcome = g.handle_pointer_at(between);
            match outcome {
                ClickOutcome::Selected { cell, .. } | ClickOutcome::Deselected(cell) => {
                    assert_eq!(cell, CellId::new(0, 0))
                }
                ClickOutcome::Created(_) => panic!("tie resolved to a different cell"),
            }
        }
        assert!(!g.grid().is_occupied(CellId::new(0, 1)));
    }

    #[test]
    fn fade_falls_across_the_beat() {
        let mut g = new_grid();
        click(&mut g, 0, 5);
        click(&mut g, 2, 5);
        let cell = CellId::new(2, 5);

        let mut brightness = |playhead| {
            g.tick(5, playhead);
            g.sink().brightness_of(cell).unwrap()
        };
        let b0 = brightness(0.0);
        let b5 = brightness(0.5);
        let b99 = brightness(0.99);
        assert_eq!(b0, 1.0);
        assert!(b0 >= b5 && b5 >= b99);
        assert!((b5 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fade_skips_selection_and_empty_cells() {
        let mut g = new_grid();
        click(&mut g, 0, 5);
        click(&mut g, 0, 5); // selected
        g.sink_mut().take();

        g.tick(5, 0.5);
        assert_eq!(g.sink().brightness_of(CellId::new(0, 5)), None);
        assert_eq!(g.sink().brightness_of(CellId::new(1, 5)), None);
    }

    #[test]
    fn slot_change_turns_off_previous_column() {
        let mut g = new_grid();
        click(&mut g, 0, 3);
        click(&mut g, 1, 3);
        click(&mut g, 1, 4);
        click(&mut g, 1, 3); // select (1, 3)

        g.tick(3, 0.0);
        g.sink_mut().take();
        g.tick(4, 0.0);

        let calls = g.sink_mut().take();
        assert!(calls.contains(&SinkCall::Emission(CellId::new(0, 3), false)));
        assert!(!calls.contains(&SinkCall::Emission(CellId::new(1, 3), false)));
        assert!(calls.contains(&SinkCall::Emission(CellId::new(1, 4), true)));
        assert_eq!(g.previous_slot(), Some(4));
    }

    #[test]
    fn first_tick_has_nothing_to_turn_off() {
        let mut g = new_grid();
        click(&mut g, 0, 0);
        g.sink_mut().take();
        g.tick(0, 0.0);
        assert!(!g.sink().calls.iter().any(|c| matches!(c, SinkCall::Emission(_, false))));
        assert_eq!(g.previous_slot(), Some(0));
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut g = new_grid();
        g.tick(16, 0.3);
        assert_eq!(g.previous_slot(), None);
        // the background still tracks the frame
        assert_eq!(g.sink().calls, vec![SinkCall::Background(0.0)]);
    }

    #[test]
    fn sync_reads_bridge_snapshot() {
        let mut g = new_grid();
        click(&mut g, 3, 11);
        g.bridge_mut().playback.current_slot = 11;
        g.bridge_mut().playback.playhead = 0.75;
        g.sync();
        assert_eq!(g.previous_slot(), Some(11));
        assert!((g.sink().brightness_of(CellId::new(3, 11)).unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn layer_intensity_follows_patch_count() {
        let mut g = new_grid();
        for col in 0..7 {
            click(&mut g, 0, col);
        }
        assert_eq!(g.sink().last_particle_rate(), Some(0.0));
        click(&mut g, 0, 7);
        assert_eq!(g.sink().last_particle_rate(), Some(15.0));
        click(&mut g, 0, 8);
        assert!((g.sink().last_particle_rate().unwrap() - 32.4).abs() < 1e-4);
    }

    #[test]
    fn layer_start_is_signalled_per_upward_crossing() {
        let mut g = new_grid();
        for col in 0..9 {
            click(&mut g, 0, col);
        }
        let start_at_nine = g.bridge().calls.ends_with(&[
            BridgeCall::LayerPatchCount(9),
            BridgeCall::Signal(BridgeEvent::StartLayer),
            BridgeCall::Signal(BridgeEvent::EditLayer),
        ]);
        assert!(start_at_nine);

        // climbing past 9 does not restart
        click(&mut g, 0, 9);
        // drop to 8 and climb back up through 9
        click(&mut g, 0, 9);
        g.delete_patch();
        click(&mut g, 0, 8);
        g.delete_patch();
        click(&mut g, 0, 8);
        let starts = g
            .bridge()
            .signals()
            .into_iter()
            .filter(|e| *e == BridgeEvent::StartLayer)
            .count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn off_grid_cell_is_never_created() {
        let mut g = new_grid();
        assert!(!g.create_patch(CellId { row: 0, col: 16 }));
        assert!(!g.create_patch(CellId { row: 4, col: 0 }));
        assert_eq!(g.grid().patch_count(), 0);
        assert!(!g.grid().is_occupied(CellId::new(1, 0)));
        assert!(g.bridge().calls.is_empty());
        assert!(g.sink().calls.is_empty());
        assert_eq!(click(&mut g, 1, 0), ClickOutcome::Created(CellId::new(1, 0)));
    }

    #[test]
    fn non_finite_playhead_fades_to_dark() {
        assert_eq!(fade_value(f32::NAN), 0.0);
        assert_eq!(fade_value(f32::INFINITY), 0.0);
        assert_eq!(fade_value(0.0), 1.0);
    }

    #[test]
    fn toggle_layer_writes_effective_count() {
        let mut g = new_grid();
        for col in 0..10 {
            click(&mut g, 1, col);
        }
        g.bridge_mut().take();

        g.toggle_layer();
        assert!(!g.layer().is_active());
        assert_eq!(
            g.bridge_mut().take(),
            vec![
                BridgeCall::LayerPatchCount(0),
                BridgeCall::Signal(BridgeEvent::EditLayer),
            ]
        );
        assert_eq!(g.sink().last_particle_rate(), Some(0.0));

        // edits while off leave the layer alone
        click(&mut g, 2, 0);
        assert!(!g.bridge().calls.contains(&BridgeCall::Signal(BridgeEvent::EditLayer)));
        g.bridge_mut().take();

        g.toggle_layer();
        assert_eq!(
            g.bridge().calls,
            vec![
                BridgeCall::LayerPatchCount(11),
                BridgeCall::Signal(BridgeEvent::EditLayer),
            ]
        );
        assert!((g.sink().last_particle_rate().unwrap() - 48.4).abs() < 1e-3);
    }

    #[test]
    fn input_events_dispatch() {
        let mut g = new_grid();
        g.handle_input(InputEvent::Pointer(at(0, 2)));
        g.handle_input(InputEvent::Pointer(at(0, 2)));
        g.handle_input(InputEvent::SetPitch(1));
        g.handle_input(InputEvent::SetPattern(2));
        let cell = CellId::new(0, 2);
        assert_eq!(g.grid().cell(cell).pitch, 1);
        assert_eq!(g.grid().cell(cell).pattern, 2);

        g.handle_input(InputEvent::DeletePatch);
        assert!(!g.grid().is_occupied(cell));

        g.handle_input(InputEvent::ToggleLayer);
        assert!(!g.layer().is_active());

        g.handle_input(InputEvent::CycleBackground);
        g.tick(0, 0.0);
        assert_eq!(g.sink().calls.last(), Some(&SinkCall::Background(1.0)));
    }
}
