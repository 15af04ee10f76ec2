use std::path::{Path, PathBuf};

use patchgrid::shared::NUM_PATTERNS;

use crate::audio::SampleBuffer;

// All *.wav files directly inside `dir`, sorted by file name
pub fn index_wav_in_dir(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// One sample per pattern index, taken in file-name order. Patterns without a
/// loadable file stay `None` and fall back to the engine's tone.
pub fn load_pattern_samples(dir: &Path, target_rate: u32) -> [Option<SampleBuffer>; NUM_PATTERNS] {
    let mut samples: [Option<SampleBuffer>; NUM_PATTERNS] = Default::default();

    let paths = match index_wav_in_dir(dir) {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("cannot list samples in {}: {e}", dir.display());
            return samples;
        }
    };

    for (slot, path) in samples.iter_mut().zip(paths.iter().take(NUM_PATTERNS)) {
        match SampleBuffer::load_wav(path, target_rate) {
            Ok(buffer) => {
                log::info!("pattern sample {} ({} frames)", path.display(), buffer.len());
                *slot = Some(buffer);
            }
            Err(e) => log::warn!("skipping sample {}: {e:#}", path.display()),
        }
    }
    samples
}
