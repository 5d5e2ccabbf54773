//! Silence and loudness analysis passes.
//!
//! Both passes decode the whole file through the null muxer and read the
//! filter results back from FFmpeg's log.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use scrub_models::{LoudnessMetrics, SilenceInterval, SilenceSummary};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters;
use crate::parse::{parse_loudness, parse_silences};

/// Run `silencedetect` and return the detected intervals in order.
///
/// A file without any silence yields an empty list.
pub async fn detect_silences(
    runner: &FfmpegRunner,
    path: impl AsRef<Path>,
    threshold_db: f64,
    min_duration: f64,
) -> MediaResult<Vec<SilenceInterval>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let cmd = FfmpegCommand::analysis(path)
        .output_arg("-vn")
        .audio_filter(filters::silencedetect(threshold_db, min_duration));
    let log = runner.run_captured(&cmd).await?;

    let silences = parse_silences(&log).unwrap_or_default();
    let summary = SilenceSummary::from_silences(&silences);
    info!(
        path = %path.display(),
        threshold_db,
        min_duration,
        count = summary.count,
        total_secs = summary.total_duration,
        "Detected silences"
    );

    Ok(silences)
}

/// Run `ebur128` and return the summary metrics, if FFmpeg printed any.
pub async fn measure_loudness(
    runner: &FfmpegRunner,
    path: impl AsRef<Path>,
) -> MediaResult<Option<LoudnessMetrics>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let cmd = FfmpegCommand::analysis(path)
        .output_arg("-vn")
        .audio_filter(filters::EBUR128);
    let log = runner.run_captured(&cmd).await?;

    let metrics = parse_loudness(&log);
    match &metrics {
        Some(metrics) => debug!(
            path = %path.display(),
            integrated = ?metrics.integrated(),
            range = ?metrics.range(),
            "Measured loudness"
        ),
        None => debug!(path = %path.display(), "No loudness summary in FFmpeg output"),
    }

    Ok(metrics)
}

/// `<stem>_silences.csv` next to the input.
pub fn silences_csv_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{}_silences.csv", stem))
}

/// Render silences as `start,end,duration` lines without a header; absent
/// values are left empty.
pub fn silences_to_csv(silences: &[SilenceInterval]) -> String {
    let mut csv = String::with_capacity(32 * silences.len());

    for silence in silences {
        let end = silence.end.map(|v| v.to_string()).unwrap_or_default();
        let duration = silence.duration.map(|v| v.to_string()).unwrap_or_default();
        let _ = writeln!(csv, "{},{},{}", silence.start, end, duration);
    }

    csv
}

/// Write the silences CSV to `path`.
pub async fn write_silences_csv(
    path: impl AsRef<Path>,
    silences: &[SilenceInterval],
) -> MediaResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, silences_to_csv(silences)).await?;
    debug!(path = %path.display(), count = silences.len(), "Wrote silences CSV");
    Ok(())
}
