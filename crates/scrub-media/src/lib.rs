#![deny(unreachable_patterns)]
//! Filter-graph synthesis and FFmpeg glue for scrubbing lecture recordings.
//!
//! This crate provides:
//! - Parsers for FFmpeg/FFprobe diagnostic output
//! - Silence normalization and filter-graph synthesis
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation support via tokio
//! - Silence and loudness analysis, trimming, loudness matching and rendering

pub mod analysis;
pub mod command;
pub mod error;
pub mod filters;
pub mod graph;
pub mod loudness;
pub mod parse;
pub mod probe;
pub mod progress;
pub mod scrub;
pub mod trim;

pub use analysis::{
    detect_silences, measure_loudness, silences_csv_path, silences_to_csv, write_silences_csv,
};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner, Toolchain};
pub use error::{MediaError, MediaResult};
pub use graph::{normalize_silences, FilterGraph, GraphError, Instruction, Port, Segment, SegmentKind};
pub use loudness::match_loudness;
pub use parse::{parse_duration, parse_loudness, parse_sample_rate, parse_silences};
pub use probe::{probe_media, MediaInfo};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use scrub::{
    filter_graph_path, prepare_filter_graph, render_with_script, write_filter_script,
    FilterScript, RenderJob, ScrubPlan, ScrubSettings,
};
pub use trim::{trim_media, trimmed_path, TrimRange};
