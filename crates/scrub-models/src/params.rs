//! Parameters controlling filter-graph synthesis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default speedup factor for silent regions.
pub const DEFAULT_FACTOR: f64 = 8.0;
/// Default guard interval kept at normal speed on each side of a silence.
pub const DEFAULT_DELAY: f64 = 0.25;
/// Default input sample rate assumed when none was measured.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// How the audio of a sped-up region is shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HastenMode {
    /// Keep only the first `1/factor` of the region's audio
    #[serde(rename = "trunc")]
    Truncate,
    /// Resample at `factor` times the rate and mute (pitch goes up)
    Pitch,
    /// Change tempo by `factor` keeping pitch
    #[default]
    Tempo,
}

impl HastenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HastenMode::Truncate => "trunc",
            HastenMode::Pitch => "pitch",
            HastenMode::Tempo => "tempo",
        }
    }
}

impl fmt::Display for HastenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HastenMode {
    type Err = HastenModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trunc" | "truncate" => Ok(HastenMode::Truncate),
            "pitch" => Ok(HastenMode::Pitch),
            "tempo" => Ok(HastenMode::Tempo),
            _ => Err(HastenModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown hasten mode: {0}")]
pub struct HastenModeParseError(String);

/// Which stereo channel, if any, is copied onto both outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanMode {
    #[default]
    None,
    Left,
    Right,
}

impl PanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanMode::None => "none",
            PanMode::Left => "left",
            PanMode::Right => "right",
        }
    }

    /// Whether a channel is duplicated.
    pub fn is_active(&self) -> bool {
        !matches!(self, PanMode::None)
    }
}

impl fmt::Display for PanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PanMode {
    type Err = PanModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(PanMode::None),
            "left" => Ok(PanMode::Left),
            "right" => Ok(PanMode::Right),
            _ => Err(PanModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown pan mode: {0}")]
pub struct PanModeParseError(String);

/// Target display resolution for rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Full HD (1920x1080)
    pub const FULL_HD: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Invalid filter-graph parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("Speed factor must be a positive number, got {0}")]
    InvalidFactor(f64),

    #[error("Delay must be a non-negative number, got {0}")]
    InvalidDelay(f64),

    #[error("Delay {delay}s is too long for {silence_duration}s silences (need 2*delay < silence duration)")]
    DelayTooLong { delay: f64, silence_duration: f64 },

    #[error("Rescale target must have non-zero dimensions, got {0}")]
    InvalidResolution(Resolution),

    #[error("Sample rate must be non-zero for pitch hastening")]
    InvalidSampleRate,

    #[error("Silent volume must be a non-negative number, got {0}")]
    InvalidSilentVolume(f64),

    #[error("Gain must be a finite number, got {0}")]
    InvalidGain(f64),
}

/// Immutable configuration of one filter-graph build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGraphParams {
    /// Speedup factor applied inside silences
    pub factor: f64,
    /// Seconds kept at normal speed after a silence starts and before it ends
    pub delay: f64,
    /// Scale and pad to this resolution
    pub rescale: Option<Resolution>,
    /// Channel duplication
    pub pan: PanMode,
    /// Additive gain in dB applied to the final audio
    pub gain_db: f64,
    /// Audio handling inside sped-up regions
    pub hasten: HastenMode,
    /// Input audio sample rate in Hz
    pub sample_rate: u32,
    /// Volume multiplier for the audio of sped-up regions
    pub silent_volume: f64,
}

impl Default for FilterGraphParams {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FACTOR,
            delay: DEFAULT_DELAY,
            rescale: None,
            pan: PanMode::None,
            gain_db: 0.0,
            hasten: HastenMode::Tempo,
            sample_rate: DEFAULT_SAMPLE_RATE,
            silent_volume: 1.0,
        }
    }
}

impl FilterGraphParams {
    /// Create parameters with the given speedup factor and defaults elsewhere.
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_rescale(mut self, resolution: Resolution) -> Self {
        self.rescale = Some(resolution);
        self
    }

    pub fn with_pan(mut self, pan: PanMode) -> Self {
        self.pan = pan;
        self
    }

    pub fn with_gain_db(mut self, gain_db: f64) -> Self {
        self.gain_db = gain_db;
        self
    }

    pub fn with_hasten(mut self, hasten: HastenMode) -> Self {
        self.hasten = hasten;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_silent_volume(mut self, silent_volume: f64) -> Self {
        self.silent_volume = silent_volume;
        self
    }

    /// Whether the audio post-stage (pan and/or gain) is needed.
    pub fn needs_audio_stage(&self) -> bool {
        self.pan.is_active() || self.gain_db != 0.0
    }

    /// Check the parameters that do not depend on the detected silences.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(ParamError::InvalidFactor(self.factor));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ParamError::InvalidDelay(self.delay));
        }
        if let Some(resolution) = self.rescale {
            if resolution.width == 0 || resolution.height == 0 {
                return Err(ParamError::InvalidResolution(resolution));
            }
        }
        if self.hasten == HastenMode::Pitch && self.sample_rate == 0 {
            return Err(ParamError::InvalidSampleRate);
        }
        if !self.silent_volume.is_finite() || self.silent_volume < 0.0 {
            return Err(ParamError::InvalidSilentVolume(self.silent_volume));
        }
        if !self.gain_db.is_finite() {
            return Err(ParamError::InvalidGain(self.gain_db));
        }
        Ok(())
    }

    /// Check that every silence at least `silence_duration` long keeps a
    /// non-empty sped-up region.
    pub fn check_delay_against(&self, silence_duration: f64) -> Result<(), ParamError> {
        if 2.0 * self.delay < silence_duration {
            Ok(())
        } else {
            Err(ParamError::DelayTooLong {
                delay: self.delay,
                silence_duration,
            })
        }
    }
}
