// Stand-in for the external audio engine. Runs inside the output callback:
// keeps the step clock, applies committed edits, plays the grid and the
// background drone.

use std::f32::consts::TAU;
use std::sync::Arc;

use patchgrid::audio_api::{AudioCommand, BridgeEvent, CellEdit, PlaybackClock, PlaybackSnapshot};
use patchgrid::shared::{CellId, COLS, NUM_CELLS, NUM_PATTERNS, ROWS};

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::voice::{tone_freq, Voice};

const MAX_VOICES: usize = 32; // hard cap so we wont malloc in audio callback
const DRONE_HZ: [f32; 2] = [55.0, 82.5];
const DRONE_MAX_GAIN: f32 = 0.15;
const DRONE_SLEW: f32 = 0.0002; // per-frame approach toward the target gain

#[derive(Clone, Copy, Debug, PartialEq)]
struct Step {
    pattern: u8,
    pitch: u8,
    gain: f32,
}

// cells play nothing until the grid commits an edit for them
const SILENT: Step = Step { pattern: 0, pitch: 0, gain: 0.0 };

#[derive(Clone, Debug, Default)]
struct Drone {
    started: bool,
    patch_count: usize, // last written, applied on the next EditLayer
    target: f32,
    gain: f32,
    phases: [f32; 2],
}

pub struct Transport {
    pub frames_per_step: usize,
    pub steps_per_beat: u32,
}

impl Transport {
    pub fn new(sample_rate: f32, bpm: f32, steps_per_beat: u32) -> Self {
        let steps_per_beat = steps_per_beat.max(1);
        let frames_per_beat = sample_rate * 60.0 / bpm;
        Self {
            frames_per_step: (frames_per_beat / steps_per_beat as f32).round().max(1.0) as usize,
            steps_per_beat,
        }
    }
}

pub struct Engine {
    sample_rate: f32,
    transport: Transport,
    master_gain: f32,
    step: usize,       // slot currently playing
    frame_in_step: usize,
    pending: Option<CellEdit>,
    table: [Step; NUM_CELLS],
    samples: [Option<SampleBuffer>; NUM_PATTERNS],
    voices: [Voice; MAX_VOICES], // fixed pool of voices
    drone: Drone,
    clock: Arc<PlaybackClock>,
}

impl Engine {
    pub fn new(
        sample_rate: f32,
        transport: Transport,
        master_gain: f32,
        samples: [Option<SampleBuffer>; NUM_PATTERNS],
        clock: Arc<PlaybackClock>,
    ) -> Self {
        Self {
            sample_rate,
            transport,
            master_gain,
            step: 0,
            frame_in_step: 0,
            pending: None,
            table: [SILENT; NUM_CELLS],
            samples,
            voices: [Voice::default(); MAX_VOICES],
            drone: Drone::default(),
            clock,
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::WriteEdit(edit) => self.pending = Some(edit),
            AudioCommand::Signal(BridgeEvent::EditHappened) => {
                if let Some(edit) = self.pending.take() {
                    self.table[edit.cell.index()] = Step {
                        pattern: edit.pattern,
                        pitch: edit.pitch,
                        gain: edit.gain,
                    };
                }
            }
            AudioCommand::Signal(BridgeEvent::StartLayer) => self.drone.started = true,
            AudioCommand::Signal(BridgeEvent::EditLayer) => {
                let count = self.drone.patch_count.min(NUM_CELLS);
                self.drone.target = DRONE_MAX_GAIN * count as f32 / NUM_CELLS as f32;
            }
            AudioCommand::LayerPatchCount(count) => self.drone.patch_count = count,
        }
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());

        let mut offset = 0;
        while offset < out.len() {
            if self.frame_in_step == 0 {
                self.trigger_step();
            }
            let n = (self.transport.frames_per_step - self.frame_in_step).min(out.len() - offset);
            let chunk = &mut out[offset..offset + n];

            for voice in self.voices.iter_mut().filter(|v| v.active) {
                voice.render_into(&self.samples, chunk);
            }
            self.render_drone(chunk);

            offset += n;
            self.frame_in_step += n;
            if self.frame_in_step >= self.transport.frames_per_step {
                self.frame_in_step = 0;
                self.step = (self.step + 1) % COLS;
            }
        }

        for frame in out.iter_mut() {
            frame.left = (frame.left * self.master_gain).clamp(-1.0, 1.0);
            frame.right = (frame.right * self.master_gain).clamp(-1.0, 1.0);
        }
        self.clock.publish(self.position());
    }

    /// Slot and beat fraction at the current frame.
    pub fn position(&self) -> PlaybackSnapshot {
        let per_beat = self.transport.steps_per_beat as usize;
        let step_in_beat = self.step % per_beat;
        let frames_into_beat = step_in_beat * self.transport.frames_per_step + self.frame_in_step;
        let frames_per_beat = per_beat * self.transport.frames_per_step;
        PlaybackSnapshot {
            current_slot: self.step,
            playhead: frames_into_beat as f32 / frames_per_beat as f32,
        }
    }

    fn trigger_step(&mut self) {
        for row in 0..ROWS {
            let step = self.table[CellId::new(row, self.step).index()];
            if step.gain <= 0.0 {
                continue;
            }
            let voice = match &self.samples[step.pattern as usize % NUM_PATTERNS] {
                Some(_) => Voice::sample(step.pattern as usize, step.pitch, step.gain),
                None => Voice::tone(tone_freq(row, step.pitch), self.sample_rate, step.gain),
            };
            // steal the first voice if the pool is full
            let slot = self.voices.iter().position(|v| !v.active).unwrap_or(0);
            self.voices[slot] = voice;
        }
    }

    fn render_drone(&mut self, out: &mut [StereoFrame]) {
        let d = &mut self.drone;
        if !d.started {
            return;
        }
        for frame in out.iter_mut() {
            d.gain += (d.target - d.gain).clamp(-DRONE_SLEW, DRONE_SLEW);
            let mut s = 0.0;
            for (phase, hz) in d.phases.iter_mut().zip(DRONE_HZ) {
                s += phase.sin();
                *phase = (*phase + TAU * hz / self.sample_rate) % TAU;
            }
            frame.mix(StereoFrame::mono(s * 0.5), d.gain);
        }
    }

    #[cfg(test)]
    fn step_at(&self, cell: CellId) -> Step {
        self.table[cell.index()]
    }

    #[cfg(test)]
    fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }
}
