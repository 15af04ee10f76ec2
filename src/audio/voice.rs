use std::f32::consts::TAU;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;

// C major scale, semitones above C for pitch classes 0..7
const SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
// lowest row plays an octave below middle A
const ROW_BASE_HZ: f32 = 110.0;
const TONE_DECAY_PER_SEC: f32 = 6.0;
const SILENCE: f32 = 0.0005;

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

pub fn semitones(pitch: u8) -> i32 {
    SCALE[(pitch as usize).min(SCALE.len() - 1)]
}

/// Playback-rate multiplier for a pitch class.
pub fn pitch_ratio(pitch: u8) -> f32 {
    2.0_f32.powf(semitones(pitch) as f32 / 12.0)
}

/// Frequency of the fallback tone for a row/pitch pair, one octave per row.
pub fn tone_freq(row: usize, pitch: u8) -> f32 {
    ROW_BASE_HZ * 2.0_f32.powi(row as i32) * pitch_ratio(pitch)
}

#[derive(Clone, Copy, Debug)]
enum Source {
    // index into the engine's per-pattern sample table
    Sample { pattern: usize, pos: f32, rate: f32 },
    Tone { phase: f32, phase_inc: f32, amp: f32, decay: f32 },
}

#[derive(Clone, Copy, Debug)]
pub struct Voice {
    source: Source,
    gain: f32,
    pub active: bool,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            source: Source::Tone { phase: 0.0, phase_inc: 0.0, amp: 0.0, decay: 1.0 },
            gain: 0.0,
            active: false,
        }
    }
}

impl Voice {
    pub fn sample(pattern: usize, pitch: u8, gain: f32) -> Self {
        Self {
            source: Source::Sample { pattern, pos: 0.0, rate: pitch_ratio(pitch) },
            gain,
            active: true,
        }
    }

    pub fn tone(freq: f32, sample_rate: f32, gain: f32) -> Self {
        Self {
            source: Source::Tone {
                phase: 0.0,
                phase_inc: TAU * freq / sample_rate,
                amp: 0.25,
                decay: (-TONE_DECAY_PER_SEC / sample_rate).exp(),
            },
            gain,
            active: true,
        }
    }

    /// Mix this voice into `out`. Goes inactive once the sample runs out or
    /// the tone has decayed to silence.
    pub fn render_into(&mut self, samples: &[Option<SampleBuffer>], out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }
        match &mut self.source {
            Source::Sample { pattern, pos, rate } => {
                let Some(buffer) = samples.get(*pattern).and_then(Option::as_ref) else {
                    self.active = false;
                    return;
                };
                let data = &buffer.data;
                for frame in out.iter_mut() {
                    let i = *pos as usize;
                    if i >= data.len() {
                        self.active = false;
                        break;
                    }
                    let frac = *pos - i as f32;
                    let s0 = data[i];
                    let s1 = data.get(i + 1).copied().unwrap_or(s0);
                    let s = StereoFrame {
                        left: lerp(s0.left, s1.left, frac),
                        right: lerp(s0.right, s1.right, frac),
                    };
                    frame.mix(s, self.gain);
                    *pos += *rate;
                }
            }
            Source::Tone { phase, phase_inc, amp, decay } => {
                for frame in out.iter_mut() {
                    if *amp < SILENCE {
                        self.active = false;
                        break;
                    }
                    frame.mix(StereoFrame::mono(*amp * phase.sin()), self.gain);
                    *phase = (*phase + *phase_inc) % TAU;
                    *amp *= *decay;
                }
            }
        }
    }
}
