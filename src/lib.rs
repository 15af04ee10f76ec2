//! patchgrid - a headless 4x16 step-sequencer grid
//!
//! The library holds the grid model and the two contracts it talks through:
//! - `SequencerGrid`: click/key handling, patch edits, per-frame playhead sync
//! - `AudioBridge`: where edits go and where the playback position comes from
//! - `PresentationSink`: where every visual change goes
//!
//! The `patchgrid` binary wires these to a terminal front end and a small
//! in-process audio engine.

pub mod audio_api;
pub mod color;
pub mod config;
pub mod geometry;
pub mod middle;
pub mod pipeline;
pub mod presentation;
pub mod shared;

// Re-export commonly used types
pub use audio_api::{AudioBridge, AudioCommand, BridgeEvent, CellEdit, PlaybackClock, PlaybackSnapshot};
pub use geometry::{Anchor, AnchorLayout, Anchors, Orientation, Vec3};
pub use middle::{ClickOutcome, SequencerGrid};
pub use presentation::PresentationSink;
pub use shared::{CellId, InputEvent};
