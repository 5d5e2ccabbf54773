//! FFmpeg filter fragments.
//!
//! Each function returns the text of a single filter (or a short chain) with
//! timestamps in fixed 4-decimal form. Port labels are added by the graph
//! writer, never here.

use scrub_models::{format_fixed, PanMode, Resolution};

/// Rebase video timestamps to start at zero.
pub const RESET_PTS: &str = "setpts=PTS-STARTPTS";

/// Rebase audio timestamps to start at zero.
pub const RESET_AUDIO_PTS: &str = "asetpts=PTS-STARTPTS";

/// Mute the stream.
pub const MUTE: &str = "volume=0.0";

/// EBU R128 loudness measurement.
pub const EBUR128: &str = "ebur128";

/// Range FFmpeg's `atempo` filter accepts per instance.
pub const ATEMPO_MIN: f64 = 0.5;
pub const ATEMPO_MAX: f64 = 2.0;

/// Format a ratio with at most 4 decimals and at least one.
///
/// `2.0 -> "2.0"`, `1.25 -> "1.25"`, `0.33333 -> "0.3333"`.
pub fn format_ratio(value: f64) -> String {
    let fixed = format_fixed(value);
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn trim_args(start: f64, end: Option<f64>) -> String {
    match end {
        Some(end) => format!("{}:{}", format_fixed(start), format_fixed(end)),
        None => format!("start={}", format_fixed(start)),
    }
}

/// Video trim of `[start, end)`; an open end runs to the end of the stream.
pub fn trim(start: f64, end: Option<f64>) -> String {
    format!("trim={}", trim_args(start, end))
}

/// Audio trim of `[start, end)`; an open end runs to the end of the stream.
pub fn atrim(start: f64, end: Option<f64>) -> String {
    format!("atrim={}", trim_args(start, end))
}

/// Rebase video timestamps and divide them by `factor`.
pub fn compress_pts(factor: f64) -> String {
    format!("setpts=(PTS-STARTPTS)/{}", format_ratio(factor))
}

/// Split a tempo factor into `atempo` stages within FFmpeg's accepted range.
///
/// The product of the stages equals `factor`.
pub fn atempo_stages(factor: f64) -> Vec<f64> {
    let mut stages = Vec::new();
    let mut remaining = factor;

    while remaining > ATEMPO_MAX {
        stages.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        stages.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    if stages.is_empty() || (remaining - 1.0).abs() > f64::EPSILON {
        stages.push(remaining);
    }

    stages
}

/// Chain of `atempo` filters for the given stages.
pub fn atempo_chain(stages: &[f64]) -> String {
    stages
        .iter()
        .map(|stage| format!("atempo={}", format_ratio(*stage)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Reinterpret the sample rate (changes speed and pitch).
pub fn asetrate(rate: u32) -> String {
    format!("asetrate={}", rate)
}

/// Resample back to `rate`.
pub fn aresample(rate: u32) -> String {
    format!("aresample={}", rate)
}

/// Scale the volume by a linear multiplier.
pub fn volume(multiplier: f64) -> String {
    format!("volume={}", format_ratio(multiplier))
}

/// Apply gain in dB.
pub fn volume_db(gain_db: f64) -> String {
    format!("volume={:.1}dB", gain_db)
}

/// Scale to fit inside `resolution` keeping the aspect ratio.
pub fn scale_to_fit(resolution: Resolution) -> String {
    format!(
        "scale=w={}:h={}:force_original_aspect_ratio=decrease",
        resolution.width, resolution.height
    )
}

/// Pad to exactly `resolution`, centering the picture.
pub fn pad_centered(resolution: Resolution) -> String {
    format!(
        "pad={}:{}:(ow-iw)/2:(oh-ih)/2",
        resolution.width, resolution.height
    )
}

/// Copy one stereo channel onto both outputs.
pub fn pan(mode: PanMode) -> Option<&'static str> {
    match mode {
        PanMode::None => None,
        PanMode::Left => Some("pan=stereo|c0=c0|c1=c0"),
        PanMode::Right => Some("pan=stereo|c0=c1|c1=c1"),
    }
}

/// Concatenate `segments` video/audio pairs into one pair.
pub fn concat(segments: usize) -> String {
    format!("concat=n={}:v=1:a=1", segments)
}

/// Silence detection below `noise_db` lasting at least `min_duration` seconds.
pub fn silencedetect(noise_db: f64, min_duration: f64) -> String {
    format!("silencedetect=n={:.1}dB:d={}", noise_db, format_ratio(min_duration))
}
