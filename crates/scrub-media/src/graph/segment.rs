//! Timeline segments produced by the synthesizer.

use serde::Serialize;

/// Playback treatment of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Played at 1x.
    Regular,
    /// Played at `factor`x.
    SpedUp,
}

/// A contiguous range of the source timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds. `None` runs to the end of the file.
    pub end: Option<f64>,
}

impl Segment {
    pub fn regular(start: f64, end: f64) -> Self {
        Self {
            kind: SegmentKind::Regular,
            start,
            end: Some(end),
        }
    }

    pub fn sped_up(start: f64, end: f64) -> Self {
        Self {
            kind: SegmentKind::SpedUp,
            start,
            end: Some(end),
        }
    }

    /// The final segment, open-ended.
    pub fn tail(start: f64) -> Self {
        Self {
            kind: SegmentKind::Regular,
            start,
            end: None,
        }
    }

    pub fn is_sped_up(&self) -> bool {
        self.kind == SegmentKind::SpedUp
    }

    /// Length in the source. Open segments are measured up to `total_duration`.
    pub fn input_duration(&self, total_duration: f64) -> f64 {
        self.end.unwrap_or(total_duration) - self.start
    }

    /// Length in the output.
    pub fn output_duration(&self, total_duration: f64, factor: f64) -> f64 {
        let input = self.input_duration(total_duration);
        match self.kind {
            SegmentKind::Regular => input,
            SegmentKind::SpedUp => input / factor,
        }
    }

    /// Seconds removed from the output by hastening this segment.
    pub fn time_saved(&self, factor: f64) -> f64 {
        match (self.kind, self.end) {
            (SegmentKind::SpedUp, Some(end)) => {
                let input = end - self.start;
                input - input / factor
            }
            _ => 0.0,
        }
    }
}
