//! EBU R128 loudness measurements and the gain arithmetic built on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Label of the integrated loudness metric in the `ebur128` summary.
pub const INTEGRATED: &str = "I";
/// Label of the loudness range metric in the `ebur128` summary.
pub const RANGE: &str = "LRA";

/// Gain reduction applied when one stereo channel is copied onto both.
pub const PAN_GAIN_CORRECTION_DB: f64 = 3.0;

/// Loudness metrics by label (`I`, `LRA`, `Threshold`, `LRA low`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoudnessMetrics(BTreeMap<String, f64>);

impl LoudnessMetrics {
    /// Create an empty set of metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a metric. Later values win.
    pub fn insert(&mut self, label: impl Into<String>, value: f64) {
        self.0.insert(label.into(), value);
    }

    /// Look up a metric by label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// Integrated loudness in LUFS.
    pub fn integrated(&self) -> Option<f64> {
        self.get(INTEGRATED)
    }

    /// Loudness range in LU.
    pub fn range(&self) -> Option<f64> {
        self.get(RANGE)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(label, value)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for LoudnessMetrics {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Gain in dB that brings `input_lufs` to `target_lufs`.
///
/// When a single channel is duplicated onto both, the result is lowered by
/// [`PAN_GAIN_CORRECTION_DB`].
pub fn gain_to_target(input_lufs: f64, target_lufs: f64, panned: bool) -> f64 {
    let gain = target_lufs - input_lufs;
    if panned {
        gain - PAN_GAIN_CORRECTION_DB
    } else {
        gain
    }
}

/// Silence detection threshold in dB relative to the measured loudness.
///
/// The target threshold is expressed against the target loudness, so it is
/// shifted by the same amount the input differs from the target.
pub fn silence_threshold_db(input_lufs: f64, target_threshold_db: f64, target_lufs: f64) -> f64 {
    input_lufs + target_threshold_db - target_lufs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_accessors() {
        let mut metrics = LoudnessMetrics::new();
        metrics.insert("I", -23.5);
        metrics.insert("LRA", 7.2);
        metrics.insert("Threshold", -34.0);
        assert_eq!(metrics.integrated(), Some(-23.5));
        assert_eq!(metrics.range(), Some(7.2));
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn test_later_value_wins() {
        let mut metrics = LoudnessMetrics::new();
        metrics.insert("Threshold", -34.0);
        metrics.insert("Threshold", -44.0);
        assert_eq!(metrics.get("Threshold"), Some(-44.0));
    }

    #[test]
    fn test_gain_to_target() {
        assert!((gain_to_target(-24.0, -18.0, false) - 6.0).abs() < 1e-9);
        assert!((gain_to_target(-24.0, -18.0, true) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_silence_threshold() {
        // Quiet recording: threshold moves down with the measured loudness
        assert!((silence_threshold_db(-30.0, -18.0, -18.0) - (-30.0)).abs() < 1e-9);
        assert!((silence_threshold_db(-18.0, -25.0, -18.0) - (-25.0)).abs() < 1e-9);
    }
}
