// Settings loaded on startup from <project_dir>/.patchgrid/config.json.
// The grid itself is never saved; only these knobs live on disk.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::geometry::{AnchorLayout, Anchors};

const PATCHGRID_DIR: &str = ".patchgrid";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bpm: f32,
    pub steps_per_beat: u32, // slots advanced per beat; the playhead fades over one beat
    pub layout: AnchorLayout,
    pub spacing: f32,
    pub sample_dir: Option<PathBuf>, // falls back to the project dir
    pub master_gain: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            steps_per_beat: 1,
            layout: AnchorLayout::Lanes,
            spacing: 1.0,
            sample_dir: None,
            master_gain: 0.5,
        }
    }
}

impl Config {
    pub fn anchors(&self) -> Anchors {
        Anchors::new(self.layout, self.spacing)
    }

    pub fn sample_dir(&self, project_dir: &Path) -> PathBuf {
        match &self.sample_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_dir.join(dir),
            None => project_dir.to_path_buf(),
        }
    }

    // keep obviously broken values away from the audio thread
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            log::warn!("ignoring bpm {} from config", self.bpm);
            self.bpm = defaults.bpm;
        }
        if self.steps_per_beat == 0 {
            self.steps_per_beat = defaults.steps_per_beat;
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            self.spacing = defaults.spacing;
        }
        self.master_gain = if self.master_gain.is_finite() {
            self.master_gain.clamp(0.0, 1.0)
        } else {
            defaults.master_gain
        };
        self
    }
}

// <project_dir>/.patchgrid/config.json
pub fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PATCHGRID_DIR).join(CONFIG_FILE)
}

/// `Ok(None)` when there is no config file yet.
pub fn load(project_dir: &Path) -> anyhow::Result<Option<Config>> {
    let path = config_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let config: Config = serde_json::from_str(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config.sanitized()))
}

/// Loads the config, writing the defaults out if the file doesn't exist yet.
pub fn load_or_init(project_dir: &Path) -> anyhow::Result<Config> {
    if let Some(config) = load(project_dir)? {
        return Ok(config);
    }
    let config = Config::default();
    if let Err(e) = save(project_dir, &config) {
        // read-only project dirs still run with defaults
        log::warn!("could not write default config: {e:#}");
    }
    Ok(config)
}

// Save the config to disk, making the directory if it doesn't exist already
pub fn save(project_dir: &Path, config: &Config) -> anyhow::Result<()> {
    let path = config_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?; // create .patchgrid/ if needed
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
