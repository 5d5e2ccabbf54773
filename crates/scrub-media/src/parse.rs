//! Parsers for the diagnostic text FFmpeg and FFprobe write to stderr.
//!
//! Every parser returns `None` when the fact it looks for is absent. A file
//! without silences or an unreadable loudness summary is an expected outcome,
//! and callers decide whether it matters.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use scrub_models::{parse_timestamp, LoudnessMetrics, SilenceInterval};

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Duration: +([\d:.]+)").expect("valid duration regex"));

static SAMPLE_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r", (\d+) Hz").expect("valid sample rate regex"));

static SILENCE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(silence_[a-z]+): ([\-\d.]+)").expect("valid silencedetect regex")
});

static EBUR128_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Parsed_ebur128.+\r?\n").expect("valid ebur128 marker regex"));

static LOUDNESS_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][A-Za-z ]*): +([\-\d.]+)").expect("valid loudness pair regex")
});

/// Duration of the input in seconds, from the first `Duration: hh:mm:ss.ff` token.
pub fn parse_duration(text: &str) -> Option<f64> {
    let caps = DURATION.captures(text)?;
    parse_timestamp(&caps[1]).ok()
}

/// Audio sample rate in Hz.
///
/// Several streams may be listed; the last `<n> Hz` token describes the
/// audio stream that will be processed.
pub fn parse_sample_rate(text: &str) -> Option<u32> {
    SAMPLE_RATE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .last()
}

/// Silent intervals reported by the `silencedetect` filter, in order.
///
/// The filter prints `silence_start`, then `silence_end` and
/// `silence_duration` for each interval. The last interval may only carry a
/// start when the input ends while still silent.
pub fn parse_silences(text: &str) -> Option<Vec<SilenceInterval>> {
    let mut silences: Vec<SilenceInterval> = Vec::new();
    let mut seen_token = false;

    for caps in SILENCE_TOKEN.captures_iter(text) {
        let Ok(value) = caps[2].parse::<f64>() else {
            continue;
        };
        seen_token = true;

        match &caps[1] {
            "silence_start" => silences.push(SilenceInterval::open(value)),
            "silence_end" => {
                if let Some(current) = silences.last_mut() {
                    current.end = Some(value);
                }
            }
            "silence_duration" => {
                if let Some(current) = silences.last_mut() {
                    current.duration = Some(value);
                }
            }
            other => debug!(key = other, "Ignoring unknown silencedetect key"),
        }
    }

    if !seen_token {
        return None;
    }

    report_inconsistent(&silences);
    Some(silences)
}

/// Log intervals whose reported duration disagrees with `end - start`.
///
/// A start slightly below zero is normal for a recording that opens in
/// silence and is only logged at debug level. Returns the number of warnings.
fn report_inconsistent(silences: &[SilenceInterval]) -> usize {
    let mut warned = 0;
    for silence in silences.iter().filter(|s| !s.is_consistent()) {
        if silence.start < 0.0 {
            debug!(start = silence.start, "Silence starts before the recording");
            continue;
        }
        warn!(
            start = silence.start,
            end = ?silence.end,
            duration = ?silence.duration,
            "Silence duration does not match its end and start"
        );
        warned += 1;
    }
    warned
}

/// Loudness metrics from the last `ebur128` summary block.
pub fn parse_loudness(text: &str) -> Option<LoudnessMetrics> {
    let summary = EBUR128_MARKER.split(text).skip(1).last()?;

    let metrics: LoudnessMetrics = LOUDNESS_PAIR
        .captures_iter(summary)
        .filter_map(|caps| {
            let value = caps[2].parse::<f64>().ok()?;
            Some((caps[1].trim().to_string(), value))
        })
        .collect();

    if metrics.is_empty() {
        None
    } else {
        Some(metrics)
    }
}
