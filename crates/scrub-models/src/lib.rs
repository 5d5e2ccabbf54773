//! Shared data models for the lecture scrubber.
//!
//! This crate provides Serde-serializable types for:
//! - Silent intervals detected in a recording
//! - Loudness measurements and gain arithmetic
//! - Filter-graph synthesis parameters
//! - Output encoding configuration
//! - Timestamp parsing and formatting

pub mod encoding;
pub mod loudness;
pub mod params;
pub mod silence;
pub mod timestamp;

// Re-export common types
pub use encoding::EncodingConfig;
pub use loudness::{gain_to_target, silence_threshold_db, LoudnessMetrics};
pub use params::{FilterGraphParams, HastenMode, PanMode, ParamError, Resolution};
pub use silence::{SilenceInterval, SilenceSummary};
pub use timestamp::{format_clock, format_fixed, parse_timestamp, TimestampError};
