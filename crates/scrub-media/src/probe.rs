//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::command::Toolchain;
use crate::error::{MediaError, MediaResult};
use crate::parse::{parse_duration, parse_sample_rate};

/// Facts about a recording read from the FFprobe log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Sample rate of the last reported audio stream in Hz
    pub sample_rate: Option<u32>,
}

impl MediaInfo {
    /// Extract the facts from FFprobe's stderr.
    pub fn from_log(log: &str) -> Self {
        Self {
            duration: parse_duration(log),
            sample_rate: parse_sample_rate(log),
        }
    }

    /// Duration, or an error naming the missing fact.
    pub fn require_duration(&self) -> MediaResult<f64> {
        self.duration.ok_or(MediaError::NotFound("duration"))
    }

    /// Sample rate, or an error naming the missing fact.
    pub fn require_sample_rate(&self) -> MediaResult<u32> {
        self.sample_rate.ok_or(MediaError::NotFound("audio sample rate"))
    }
}

/// Run `ffprobe -hide_banner -i <path>` and parse its log.
pub async fn probe_media(toolchain: &Toolchain, path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which(&toolchain.ffprobe).map_err(|_| MediaError::FfprobeNotFound)?;

    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        path.to_string_lossy().to_string(),
    ];
    let (status, log) = toolchain
        .analysis_runner()
        .capture(&toolchain.ffprobe, &args)
        .await?;

    if !status.success() {
        return Err(MediaError::ffprobe_failed("FFprobe failed", Some(log)));
    }

    let info = MediaInfo::from_log(&log);
    debug!(
        path = %path.display(),
        duration = ?info.duration,
        sample_rate = ?info.sample_rate,
        "Probed media"
    );

    Ok(info)
}
