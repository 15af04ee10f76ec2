use std::path::Path;

use anyhow::Context;

use super::frame::StereoFrame;

/// A decoded one-shot sample, already at the device rate.
#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    // Load a WAV file from disk, downmixing/upmixing to stereo and resampling
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                // full scale for the file's bit depth
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let frames = to_stereo(&samples, spec.channels as usize);
        Ok(Self { data: resample_linear(&frames, spec.sample_rate, target_rate) })
    }
}

fn to_stereo(samples: &[f32], channels: usize) -> Vec<StereoFrame> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().map(|&x| StereoFrame::mono(x)).collect(),
        // anything past the first two channels is dropped
        n => samples
            .chunks_exact(n)
            .map(|c| StereoFrame { left: c[0], right: c[1] })
            .collect(),
    }
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.len() < 2 || source_rate == 0 {
        return frames.to_vec();
    }
    let step = source_rate as f64 / target_rate as f64; // source frames per output frame
    let out_len = ((frames.len() - 1) as f64 / step).floor() as usize + 1;

    (0..out_len)
        .map(|i| {
            let src = i as f64 * step;
            let idx = src as usize;
            let frac = (src - idx as f64) as f32;
            let a = frames[idx];
            let b = frames.get(idx + 1).copied().unwrap_or(a);
            StereoFrame {
                left: a.left + (b.left - a.left) * frac,
                right: a.right + (b.right - a.right) * frac,
            }
        })
        .collect()
}
