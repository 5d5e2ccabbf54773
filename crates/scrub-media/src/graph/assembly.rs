//! Complete filter graph: synthesized segments plus optional post-stages.

use tracing::{debug, info};

use scrub_models::{FilterGraphParams, SilenceInterval};

use super::instruction::{Instruction, Port};
use super::normalize::normalize_silences;
use super::segment::Segment;
use super::synth::{synthesize, Synthesis};
use super::writer::write_script;
use super::GraphError;

/// Final video port mapped by the render step.
pub const FINAL_VIDEO: &str = "v";
/// Final audio port mapped by the render step.
pub const FINAL_AUDIO: &str = "a";
/// Video port between the segments and the rescale stage.
pub const CONCAT_VIDEO: &str = "vn";
/// Audio port between the segments and the pan/gain stage.
pub const CONCAT_AUDIO: &str = "an";
/// Video port between scaling and padding.
pub const SCALED_VIDEO: &str = "scaled";

/// An immutable filter graph ready to be serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    synthesis: Synthesis,
    instructions: Vec<Instruction>,
}

impl FilterGraph {
    /// Normalize `silences`, synthesize segments and chain the post-stages.
    ///
    /// The graph always ends in `[v]` and `[a]`. A skipped stage makes the
    /// previous one write to the final port directly.
    pub fn build(
        silences: &[SilenceInterval],
        params: &FilterGraphParams,
    ) -> Result<Self, GraphError> {
        let normalized = normalize_silences(silences);

        let rescale = params.rescale;
        let audio_stage = params.needs_audio_stage();

        let video_out = if rescale.is_some() {
            Port::named(CONCAT_VIDEO)
        } else {
            Port::named(FINAL_VIDEO)
        };
        let audio_out = if audio_stage {
            Port::named(CONCAT_AUDIO)
        } else {
            Port::named(FINAL_AUDIO)
        };

        let synthesis = synthesize(&normalized, params, video_out.clone(), audio_out.clone())?;
        let mut instructions = synthesis.instructions.clone();

        if let Some(resolution) = rescale {
            instructions.push(Instruction::Scale {
                input: video_out,
                scaled: Port::named(SCALED_VIDEO),
                output: Port::named(FINAL_VIDEO),
                resolution,
            });
        }

        if audio_stage {
            instructions.push(Instruction::PanGain {
                input: audio_out,
                output: Port::named(FINAL_AUDIO),
                pan: params.pan,
                gain_db: params.gain_db,
            });
        }

        info!(
            detected = silences.len(),
            used = normalized.len(),
            instructions = instructions.len(),
            rescale = rescale.is_some(),
            pan = %params.pan,
            gain_db = params.gain_db,
            "Built filter graph"
        );

        Ok(Self {
            synthesis,
            instructions,
        })
    }

    /// All instructions in script order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Timeline segments.
    pub fn segments(&self) -> &[Segment] {
        &self.synthesis.segments
    }

    /// Number of silences that were hastened.
    pub fn silence_count(&self) -> usize {
        self.synthesis.silence_count()
    }

    /// Seconds removed from the output.
    pub fn time_saved(&self) -> f64 {
        self.synthesis.time_saved()
    }

    /// Output length for an input of `total_duration` seconds.
    pub fn output_duration(&self, total_duration: f64) -> f64 {
        self.synthesis.output_duration(total_duration)
    }

    /// Whether the graph contains a concatenation.
    pub fn has_concatenation(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, Instruction::Concatenate { .. }))
    }

    /// Serialize to `-filter_complex_script` text.
    pub fn to_script(&self) -> String {
        let script = write_script(&self.instructions);
        debug!(bytes = script.len(), lines = script.lines().count(), "Serialized filter graph");
        script
    }
}
