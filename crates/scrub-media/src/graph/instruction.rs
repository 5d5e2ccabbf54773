//! Instruction model of a filter graph.
//!
//! Instructions describe what the graph does. They are turned into filter
//! text only by [`super::writer`].

use std::fmt;

use scrub_models::{PanMode, Resolution};

/// A named stream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Port {
    /// Video stream of the first input (`[0:v]`).
    InputVideo,
    /// Audio stream of the first input (`[0:a]`).
    InputAudio,
    /// A label local to the script (`[name]`).
    Named(String),
}

impl Port {
    pub fn named(name: impl Into<String>) -> Self {
        Port::Named(name.into())
    }

    /// Video output of the 1-based segment `index`.
    pub fn segment_video(index: usize) -> Self {
        Port::Named(format!("v{}", index))
    }

    /// Audio output of the 1-based segment `index`.
    pub fn segment_audio(index: usize) -> Self {
        Port::Named(format!("a{}", index))
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::InputVideo => write!(f, "[0:v]"),
            Port::InputAudio => write!(f, "[0:a]"),
            Port::Named(name) => write!(f, "[{}]", name),
        }
    }
}

static INPUT_VIDEO: Port = Port::InputVideo;
static INPUT_AUDIO: Port = Port::InputAudio;

/// How the audio of a sped-up segment is shortened.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioHasten {
    /// Tempo change keeping pitch, split into stages FFmpeg accepts.
    Tempo { stages: Vec<f64> },
    /// Resample at `rate` and back to `resample_to`, muted.
    Pitch { rate: u32, resample_to: u32 },
    /// Keep only the audio up to `end`, no resampling.
    Truncate { end: f64 },
}

/// One operation of the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Cut `[start, end)` of both input streams at 1x.
    /// An open `end` runs to the end of the file.
    RegularSegment {
        index: usize,
        start: f64,
        end: Option<f64>,
        video_out: Port,
        audio_out: Port,
    },
    /// Cut `[start, end)` and play it `factor` times faster.
    SpedUpSegment {
        index: usize,
        start: f64,
        end: f64,
        factor: f64,
        audio: AudioHasten,
        /// Volume multiplier, `None` when unchanged.
        volume: Option<f64>,
        video_out: Port,
        audio_out: Port,
    },
    /// Join `(video, audio)` pairs in order into one pair.
    Concatenate {
        inputs: Vec<(Port, Port)>,
        video_out: Port,
        audio_out: Port,
    },
    /// Fit inside `resolution` keeping aspect ratio, then pad centered.
    Scale {
        input: Port,
        scaled: Port,
        output: Port,
        resolution: Resolution,
    },
    /// Duplicate a channel and/or apply gain.
    PanGain {
        input: Port,
        output: Port,
        pan: PanMode,
        gain_db: f64,
    },
}

impl Instruction {
    /// Video and audio ports this instruction writes.
    pub fn outputs(&self) -> Vec<&Port> {
        match self {
            Instruction::RegularSegment {
                video_out,
                audio_out,
                ..
            }
            | Instruction::SpedUpSegment {
                video_out,
                audio_out,
                ..
            }
            | Instruction::Concatenate {
                video_out,
                audio_out,
                ..
            } => vec![video_out, audio_out],
            Instruction::Scale { scaled, output, .. } => vec![scaled, output],
            Instruction::PanGain { output, .. } => vec![output],
        }
    }

    /// Ports this instruction reads.
    pub fn inputs(&self) -> Vec<&Port> {
        match self {
            Instruction::RegularSegment { .. } | Instruction::SpedUpSegment { .. } => {
                vec![&INPUT_VIDEO, &INPUT_AUDIO]
            }
            Instruction::Concatenate { inputs, .. } => {
                inputs.iter().flat_map(|(v, a)| [v, a]).collect()
            }
            Instruction::Scale { input, scaled, .. } => vec![input, scaled],
            Instruction::PanGain { input, .. } => vec![input],
        }
    }
}
