//! Filter-graph synthesis for speeding up silences.
//!
//! Detected silences are turned into an FFmpeg `-filter_complex` script that
//! re-times the recording segment by segment and stitches it back together.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Silences     │───►│ Normalizer   │───►│ Synthesizer  │───►│ Assembly     │
//! │ (parsed log) │    │ (drop edges) │    │ (2N+1 segs)  │    │ (scale, pan) │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//!                                                                    │
//!                                                                    ▼
//!                                                             ┌──────────────┐
//!                                                             │ Writer       │
//!                                                             │ (script text)│
//!                                                             └──────────────┘
//! ```
//!
//! Every stage is a pure in-memory transform. The graph is described by
//! [`Instruction`] values first and only turned into text by the writer.
//!
//! # Usage
//!
//! ```rust
//! use scrub_media::graph::FilterGraph;
//! use scrub_models::{FilterGraphParams, SilenceInterval};
//!
//! let silences = vec![SilenceInterval::closed(10.0, 14.0)];
//! let params = FilterGraphParams::new(2.0).with_delay(0.25);
//! let graph = FilterGraph::build(&silences, &params).unwrap();
//!
//! assert_eq!(graph.segments().len(), 3);
//! assert!(graph.to_script().contains("concat=n=3:v=1:a=1"));
//! ```

mod assembly;
mod instruction;
mod normalize;
mod segment;
mod synth;
mod writer;

use thiserror::Error;

use scrub_models::ParamError;

pub use assembly::{FilterGraph, CONCAT_AUDIO, CONCAT_VIDEO, FINAL_AUDIO, FINAL_VIDEO, SCALED_VIDEO};
pub use instruction::{AudioHasten, Instruction, Port};
pub use normalize::normalize_silences;
pub use segment::{Segment, SegmentKind};
pub use synth::{synthesize, Synthesis};
pub use writer::{render_chains, write_script};

/// Errors raised before any filter text is produced.
///
/// An empty silence list is not an error; it yields a pass-through graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParamError),

    #[error("Malformed silence #{index}: {reason}")]
    MalformedIntervals { index: usize, reason: String },
}

impl GraphError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedIntervals {
            index,
            reason: reason.into(),
        }
    }
}
