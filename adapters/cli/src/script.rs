//! Scripted input playback for headless sessions.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use outpost_core::FrameInput;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FRAME_MILLIS: u64 = 16;

/// Errors raised while loading an input script.
#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("failed to read input script {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse input script {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("frame duration must be positive")]
    ZeroFrameDuration,
}

/// Input held for a number of consecutive frames.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct ScriptStep {
    #[serde(default = "one_frame")]
    pub(crate) frames: u32,
    #[serde(default)]
    pub(crate) input: FrameInput,
}

fn one_frame() -> u32 {
    1
}

/// Ordered list of input steps replayed one frame at a time.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct InputScript {
    #[serde(default = "default_frame_millis")]
    frame_millis: u64,
    #[serde(default)]
    steps: Vec<ScriptStep>,
}

fn default_frame_millis() -> u64 {
    DEFAULT_FRAME_MILLIS
}

impl Default for InputScript {
    fn default() -> Self {
        Self {
            frame_millis: DEFAULT_FRAME_MILLIS,
            steps: Vec::new(),
        }
    }
}

impl InputScript {
    /// Loads a script from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self, ScriptError> {
        let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let script: Self = toml::from_str(&text).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if script.frame_millis == 0 {
            return Err(ScriptError::ZeroFrameDuration);
        }
        Ok(script)
    }

    /// Simulated duration of a single frame.
    pub(crate) fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.frame_millis)
    }

    /// Number of frames the script describes.
    pub(crate) fn len(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.frames)).sum()
    }

    /// Expands the steps into exactly `ticks` per-frame inputs.
    ///
    /// Frames beyond the end of the script receive idle input.
    pub(crate) fn expand(&self, ticks: u64) -> Vec<FrameInput> {
        self.steps
            .iter()
            .flat_map(|step| std::iter::repeat_n(step.input.clone(), step.frames as usize))
            .chain(std::iter::repeat(FrameInput::default()))
            .take(usize::try_from(ticks).unwrap_or(usize::MAX))
            .collect()
    }
}
