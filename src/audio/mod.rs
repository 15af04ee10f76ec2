use std::sync::Arc;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

use patchgrid::audio_api::{
    AudioBridge, AudioCommand, BridgeEvent, CellEdit, PlaybackClock, PlaybackSnapshot,
};
use patchgrid::shared::NUM_PATTERNS;

mod engine;
mod frame;
mod sample_buffer;
mod voice;

pub use sample_buffer::SampleBuffer;

use engine::{Engine, Transport};
use frame::StereoFrame;

pub struct EngineSettings {
    pub bpm: f32,
    pub steps_per_beat: u32,
    pub master_gain: f32,
}

/// The grid's bridge to the in-process engine: commands go out over a
/// channel, the playback position comes back through a shared clock.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: Arc<PlaybackClock>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        if self.tx.try_send(cmd).is_err() {
            log::warn!("audio command queue full, dropping command");
        }
    }
}

impl AudioBridge for AudioHandle {
    fn write_edit(&mut self, edit: CellEdit) {
        self.send(AudioCommand::WriteEdit(edit));
    }

    fn signal(&mut self, event: BridgeEvent) {
        log::trace!("signal {}", event.name());
        self.send(AudioCommand::Signal(event));
    }

    fn write_layer_patch_count(&mut self, count: usize) {
        self.send(AudioCommand::LayerPatchCount(count));
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        self.clock.read()
    }
}

/// Opens the default output device and starts the engine. `load_samples` is
/// handed the device rate so samples are decoded at the rate they play at.
pub fn start_audio(
    settings: &EngineSettings,
    load_samples: impl FnOnce(u32) -> [Option<SampleBuffer>; NUM_PATTERNS],
) -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;
    let clock = Arc::new(PlaybackClock::new());
    let samples = load_samples(sample_rate);

    let engine = Engine::new(
        sample_rate as f32,
        Transport::new(sample_rate as f32, settings.bpm, settings.steps_per_beat),
        settings.master_gain,
        samples,
        Arc::clone(&clock),
    );

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_output_stream_f32(&device, &config.into(), rx, engine, channels)?,
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    };
    stream.play().context("failed to play output stream")?;
    log::info!("audio running at {sample_rate} Hz, {channels} channels");

    Ok(AudioHandle {
        tx,
        clock,
        _output_stream: stream,
    })
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    // grown on the first callback, reused afterwards
    let mut scratch: Vec<StereoFrame> = Vec::with_capacity(4096);

    let err_fn = |err| log::error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            for (out, frame) in data.chunks_exact_mut(channels.max(1)).zip(&scratch) {
                match out {
                    [mono] => *mono = 0.5 * (frame.left + frame.right),
                    [l, r, rest @ ..] => {
                        *l = frame.left;
                        *r = frame.right;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
