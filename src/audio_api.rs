use std::sync::atomic::{AtomicU64, Ordering};

use crate::shared::CellId;

/// One cell's parameters as committed to the audio engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellEdit {
    pub cell: CellId,
    pub pattern: u8,
    pub pitch: u8,
    pub gain: f32,
}

/// Named triggers consumed by the audio engine's own scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeEvent {
    EditHappened,
    StartLayer,
    EditLayer,
}

impl BridgeEvent {
    pub fn name(self) -> &'static str {
        match self {
            BridgeEvent::EditHappened => "editHappened",
            BridgeEvent::StartLayer => "startLayer",
            BridgeEvent::EditLayer => "editLayer",
        }
    }
}

/// Playback position as seen by the grid on one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaybackSnapshot {
    pub current_slot: usize,
    pub playhead: f32, // fraction of the current beat, 0..1
}

/// The grid's only view of the audio engine. Writes are fire-and-forget;
/// `snapshot` is read once per frame.
pub trait AudioBridge {
    /// Stage a cell's parameters. The engine applies them on the next
    /// `BridgeEvent::EditHappened`.
    fn write_edit(&mut self, edit: CellEdit);
    fn signal(&mut self, event: BridgeEvent);
    fn write_layer_patch_count(&mut self, count: usize);
    fn snapshot(&self) -> PlaybackSnapshot;
}

#[derive(Clone, Debug, PartialEq)]
pub enum AudioCommand {
    WriteEdit(CellEdit),
    Signal(BridgeEvent),
    LayerPatchCount(usize),
}

/// Slot and playhead packed into one word, so a reader can never see a slot
/// from one step paired with a playhead from another.
#[derive(Debug, Default)]
pub struct PlaybackClock(AtomicU64);

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snap: PlaybackSnapshot) {
        let packed = ((snap.current_slot as u64) << 32) | snap.playhead.to_bits() as u64;
        self.0.store(packed, Ordering::Release);
    }

    pub fn read(&self) -> PlaybackSnapshot {
        let packed = self.0.load(Ordering::Acquire);
        PlaybackSnapshot {
            current_slot: (packed >> 32) as usize,
            playhead: f32::from_bits(packed as u32),
        }
    }
}
