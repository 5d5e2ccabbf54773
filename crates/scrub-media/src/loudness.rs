//! Loudness matching without re-timing.

use std::path::Path;
use tracing::info;

use scrub_models::gain_to_target;

use crate::analysis::measure_loudness;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::volume_db;

/// Build the command applying `gain_db` to the audio; video is copied.
pub fn loudness_command(input: &Path, output: &Path, gain_db: f64) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .video_codec("copy")
        .audio_filter(volume_db(gain_db))
}

/// Measure `input` and write `output` with its integrated loudness moved to
/// `target_lufs`. Returns the applied gain in dB.
pub async fn match_loudness(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    target_lufs: f64,
) -> MediaResult<f64> {
    let input = input.as_ref();
    let output = output.as_ref();

    let input_lufs = measure_loudness(runner, input)
        .await?
        .and_then(|metrics| metrics.integrated())
        .ok_or(MediaError::NotFound("integrated loudness"))?;
    let gain_db = gain_to_target(input_lufs, target_lufs, false);

    info!(input_lufs, target_lufs, gain_db, "Matching loudness");
    runner.run(&loudness_command(input, output, gain_db)).await?;

    Ok(gain_db)
}
