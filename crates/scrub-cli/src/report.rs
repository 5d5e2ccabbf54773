//! Terminal output: render progress, silence tables and property listings.

use std::fmt::Write as _;

use indicatif::{ProgressBar, ProgressStyle};

use scrub_media::{FfmpegProgress, MediaInfo};
use scrub_models::{format_clock, LoudnessMetrics, SilenceInterval, SilenceSummary};

const UNKNOWN: &str = "unknown";

/// Progress bar driven by FFmpeg `-progress` snapshots.
///
/// With an expected output length the bar tracks tenths of a percent and the
/// message carries an ETA from FFmpeg's reported speed. Without one it falls
/// back to a spinner showing the output time.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    bar: ProgressBar,
    expected_secs: Option<f64>,
}

/// Bar length: tenths of a percent.
const PROGRESS_STEPS: u64 = 1000;

impl RenderProgress {
    pub fn new(expected_secs: Option<f64>, quiet: bool) -> Self {
        let expected_secs = expected_secs.filter(|secs| *secs > 0.0);
        if quiet {
            return Self {
                bar: ProgressBar::hidden(),
                expected_secs,
            };
        }

        let bar = match expected_secs {
            Some(_) => {
                let bar = ProgressBar::new(PROGRESS_STEPS);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };
        Self { bar, expected_secs }
    }

    /// Callback for [`scrub_media::render_with_script`].
    pub fn callback(&self) -> impl Fn(FfmpegProgress) + Send + 'static {
        let bar = self.bar.clone();
        let expected_secs = self.expected_secs;
        move |progress| {
            match expected_secs {
                Some(total) => bar.set_position(bar_position(&progress, total)),
                None => bar.tick(),
            }
            bar.set_message(progress_message(&progress, expected_secs));
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn bar_position(progress: &FfmpegProgress, total_secs: f64) -> u64 {
    let steps = progress.percentage(total_secs) * PROGRESS_STEPS as f64 / 100.0;
    (steps.round() as u64).min(PROGRESS_STEPS)
}

fn progress_message(progress: &FfmpegProgress, expected_secs: Option<f64>) -> String {
    let mut message = format_clock(progress.out_seconds());
    if progress.speed > 0.0 {
        let _ = write!(message, " @ {:.1}x", progress.speed);
    }
    if let Some(eta) = expected_secs.and_then(|total| progress.eta_seconds(total)) {
        let _ = write!(message, ", ETA {}", format_clock(eta));
    }
    message
}

/// Table of silences with `HH:MM:SS.mmm` times and a summary line.
pub fn silence_table(silences: &[SilenceInterval]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>4}  {:<12}  {:<12}  {:>9}", "#", "start", "end", "duration");

    for (i, silence) in silences.iter().enumerate() {
        let end = silence
            .end
            .map(format_clock)
            .unwrap_or_else(|| "-".to_string());
        let duration = silence
            .span()
            .map(|d| format!("{:.3}", d))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<12}  {:<12}  {:>9}",
            i + 1,
            format_clock(silence.start),
            end,
            duration
        );
    }

    let summary = SilenceSummary::from_silences(silences);
    let _ = writeln!(
        out,
        "{} silences, {:.3}s total, {:.3}s mean",
        summary.count, summary.total_duration, summary.mean_duration
    );
    out
}

/// Listing of the probed facts and loudness metrics.
pub fn properties(info: &MediaInfo, loudness: Option<&LoudnessMetrics>) -> String {
    let mut out = String::new();

    let duration = info
        .duration
        .map(|d| format!("{} ({:.2}s)", format_clock(d), d))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let _ = writeln!(out, "Duration:     {}", duration);

    let rate = info
        .sample_rate
        .map(|r| format!("{} Hz", r))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let _ = writeln!(out, "Sample rate:  {}", rate);

    let integrated = loudness
        .and_then(|m| m.integrated())
        .map(|i| format!("{:.1} LUFS", i))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let _ = writeln!(out, "Loudness:     {}", integrated);

    let range = loudness
        .and_then(|m| m.range())
        .map(|r| format!("{:.1} LU", r))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let _ = writeln!(out, "Range:        {}", range);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_table() {
        let table = silence_table(&[
            SilenceInterval::closed(10.0, 14.5),
            SilenceInterval::open(3723.5),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("start"));
        assert!(lines[1].contains("00:00:10.000"));
        assert!(lines[1].contains("00:00:14.500"));
        assert!(lines[1].trim_end().ends_with("4.500"));
        assert!(lines[2].contains("01:02:03.500"));
        assert!(lines[2].trim_end().ends_with('-'));
        assert!(lines[3].starts_with("2 silences"));
    }

    #[test]
    fn test_properties_unknown() {
        let text = properties(&MediaInfo::default(), None);
        assert_eq!(text.matches(UNKNOWN).count(), 4);
    }

    #[test]
    fn test_properties_known() {
        let info = MediaInfo {
            duration: Some(3723.5),
            sample_rate: Some(48_000),
        };
        let loudness: LoudnessMetrics = [("I".to_string(), -23.04), ("LRA".to_string(), 7.2)]
            .into_iter()
            .collect();

        let text = properties(&info, Some(&loudness));
        assert!(text.contains("01:02:03.500 (3723.50s)"));
        assert!(text.contains("48000 Hz"));
        assert!(text.contains("-23.0 LUFS"));
        assert!(text.contains("7.2 LU"));
        assert!(!text.contains(UNKNOWN));
    }

    #[test]
    fn test_progress_message() {
        let progress = FfmpegProgress {
            out_time_ms: 90_500,
            speed: 12.34,
            ..Default::default()
        };
        assert_eq!(progress_message(&progress, None), "00:01:30.500 @ 12.3x");

        let progress = FfmpegProgress {
            out_time_ms: 30_000,
            speed: 10.0,
            ..Default::default()
        };
        assert_eq!(
            progress_message(&progress, Some(130.0)),
            "00:00:30.000 @ 10.0x, ETA 00:00:10.000"
        );

        let stalled = FfmpegProgress::default();
        assert_eq!(progress_message(&stalled, Some(60.0)), "00:00:00.000");
    }

    #[test]
    fn test_bar_position() {
        let halfway = FfmpegProgress {
            out_time_ms: 30_000,
            ..Default::default()
        };
        assert_eq!(bar_position(&halfway, 60.0), 500);

        let overshoot = FfmpegProgress {
            out_time_ms: 75_000,
            ..Default::default()
        };
        assert_eq!(bar_position(&overshoot, 60.0), PROGRESS_STEPS);
    }

    #[test]
    fn test_hidden_progress_accepts_updates() {
        let progress = RenderProgress::new(Some(60.0), true);
        let callback = progress.callback();
        callback(FfmpegProgress {
            out_time_ms: 1_000,
            ..Default::default()
        });
        progress.finish();
    }
}
