// Purely for testing: collaborators that record every call the grid makes.

use crate::audio_api::{AudioBridge, BridgeEvent, CellEdit, PlaybackSnapshot};
use crate::geometry::{Orientation, Vec3};
use crate::presentation::PresentationSink;
use crate::shared::CellId;

#[derive(Clone, Debug, PartialEq)]
pub enum BridgeCall {
    Edit(CellEdit),
    Signal(BridgeEvent),
    LayerPatchCount(usize),
}

#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub calls: Vec<BridgeCall>,
    pub playback: PlaybackSnapshot,
}

impl RecordingBridge {
    pub fn take(&mut self) -> Vec<BridgeCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn signals(&self) -> Vec<BridgeEvent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BridgeCall::Signal(e) => Some(*e),
                _ => None,
            })
            .collect()
    }
}

impl AudioBridge for RecordingBridge {
    fn write_edit(&mut self, edit: CellEdit) {
        self.calls.push(BridgeCall::Edit(edit));
    }

    fn signal(&mut self, event: BridgeEvent) {
        self.calls.push(BridgeCall::Signal(event));
    }

    fn write_layer_patch_count(&mut self, count: usize) {
        self.calls.push(BridgeCall::LayerPatchCount(count));
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        self.playback
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SinkCall {
    Materialize(CellId, Vec3, Orientation),
    Remove(CellId),
    Emission(CellId, bool),
    Brightness(CellId, f32),
    BaseColor(CellId, f32),
    Texture(CellId, u8),
    ParticleRate(f32),
    Background(f32),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn take(&mut self) -> Vec<SinkCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn brightness_of(&self, cell: CellId) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::Brightness(id, v) if *id == cell => Some(*v),
            _ => None,
        })
    }

    pub fn last_particle_rate(&self) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::ParticleRate(r) => Some(*r),
            _ => None,
        })
    }
}

impl PresentationSink for RecordingSink {
    fn materialize(&mut self, cell: CellId, position: Vec3, orientation: Orientation) {
        self.calls.push(SinkCall::Materialize(cell, position, orientation));
    }

    fn remove(&mut self, cell: CellId) {
        self.calls.push(SinkCall::Remove(cell));
    }

    fn set_emission(&mut self, cell: CellId, on: bool) {
        self.calls.push(SinkCall::Emission(cell, on));
    }

    fn set_emission_brightness(&mut self, cell: CellId, value: f32) {
        self.calls.push(SinkCall::Brightness(cell, value));
    }

    fn set_base_color(&mut self, cell: CellId, hue: f32) {
        self.calls.push(SinkCall::BaseColor(cell, hue));
    }

    fn set_texture(&mut self, cell: CellId, pattern: u8) {
        self.calls.push(SinkCall::Texture(cell, pattern));
    }

    fn set_particle_rate(&mut self, rate: f32) {
        self.calls.push(SinkCall::ParticleRate(rate));
    }

    fn set_background(&mut self, level: f32) {
        self.calls.push(SinkCall::Background(level));
    }
}
