//! Silent intervals reported by FFmpeg's `silencedetect` filter.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing reported and computed durations.
const DURATION_TOLERANCE: f64 = 1e-3;

/// A detected silent interval.
///
/// `end` and `duration` are absent when the file ended while still silent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    /// Duration in seconds as reported by the detector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl SilenceInterval {
    /// A bounded interval; the duration is derived from the bounds.
    pub fn closed(start: f64, end: f64) -> Self {
        Self {
            start,
            end: Some(end),
            duration: Some(end - start),
        }
    }

    /// An interval that never ended (silence until end of file).
    pub fn open(start: f64) -> Self {
        Self {
            start,
            end: None,
            duration: None,
        }
    }

    /// Whether the interval has an end.
    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    /// Length of the interval computed from its bounds.
    pub fn span(&self) -> Option<f64> {
        self.end.map(|end| end - self.start)
    }

    /// Check the `start >= 0` and `duration == end - start` invariants.
    pub fn is_consistent(&self) -> bool {
        if self.start < 0.0 {
            return false;
        }
        match (self.span(), self.duration) {
            (Some(span), Some(duration)) => (span - duration).abs() <= DURATION_TOLERANCE,
            _ => true,
        }
    }
}

/// Aggregate figures over a list of detected silences.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SilenceSummary {
    /// Number of detected intervals, open ones included
    pub count: usize,
    /// Sum of known durations in seconds
    pub total_duration: f64,
    /// Mean of known durations in seconds (0 when none are known)
    pub mean_duration: f64,
}

impl SilenceSummary {
    /// Summarize a list of silences. Intervals without a duration only count.
    pub fn from_silences(silences: &[SilenceInterval]) -> Self {
        let durations: Vec<f64> = silences.iter().filter_map(|s| s.duration).collect();
        let total_duration: f64 = durations.iter().sum();
        let mean_duration = if durations.is_empty() {
            0.0
        } else {
            total_duration / durations.len() as f64
        };

        Self {
            count: silences.len(),
            total_duration,
            mean_duration,
        }
    }
}
