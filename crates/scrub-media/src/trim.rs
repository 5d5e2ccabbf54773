//! Cutting a recording down to a time range.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Time range and codec for a trim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrimRange {
    /// Drop everything before this time, in seconds
    pub start: Option<f64>,
    /// Drop everything after this time, in seconds
    pub stop: Option<f64>,
    /// Re-encode video with this codec; stream copy when `None`
    pub video_codec: Option<String>,
}

impl TrimRange {
    pub fn new(start: Option<f64>, stop: Option<f64>) -> Self {
        Self {
            start,
            stop,
            video_codec: None,
        }
    }

    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    /// Check that the bounds are non-negative and ordered.
    pub fn validate(&self) -> MediaResult<()> {
        for bound in [self.start, self.stop].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(MediaError::InvalidArgument(format!(
                    "trim bound must be a non-negative time, got {}",
                    bound
                )));
            }
        }
        if let (Some(start), Some(stop)) = (self.start, self.stop) {
            if stop <= start {
                return Err(MediaError::InvalidArgument(format!(
                    "trim stop {} is not after start {}",
                    stop, start
                )));
            }
        }
        Ok(())
    }

    /// Build the FFmpeg command for trimming `input` into `output`.
    pub fn command(&self, input: &Path, output: &Path) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new(input, output);

        // A zero start is the default and would only slow down seeking
        if let Some(start) = self.start.filter(|s| *s > 0.0) {
            cmd = cmd.seek(start);
        }
        if let Some(stop) = self.stop {
            cmd = cmd.stop_at(stop);
        }

        match &self.video_codec {
            Some(codec) => cmd.video_codec(codec.clone()),
            None => cmd.stream_copy(),
        }
    }
}

/// `<stem>_trimmed.<ext>` next to the input.
pub fn trimmed_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}_trimmed.{}", stem, ext.to_string_lossy()),
        None => format!("{}_trimmed", stem),
    };
    input.with_file_name(name)
}

/// Extract `range` of `input` into `output`.
pub async fn trim_media(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    range: &TrimRange,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }
    range.validate()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        start = ?range.start,
        stop = ?range.stop,
        "Trimming"
    );

    runner.run(&range.command(input, output)).await?;

    info!("Trimmed: {}", output.display());
    Ok(())
}
