//! Output encoding configuration.
//!
//! Rendering a filter graph always re-encodes. The defaults follow the
//! usual "streamable upload" recommendations: H.264 with short closed GOPs
//! and AAC audio at 48 kHz.

use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 20;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";
/// Default audio sample rate of the rendered file
pub const DEFAULT_AUDIO_RATE: u32 = 48_000;
/// Default pixel format
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Video encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Maximum number of consecutive B-frames
    #[serde(default = "default_b_frames")]
    pub b_frames: u8,

    /// Keyframe interval in frames (closed GOP)
    #[serde(default = "default_gop")]
    pub gop: u32,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio sample rate in Hz
    #[serde(default = "default_audio_rate")]
    pub audio_rate: u32,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Additional FFmpeg output arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_b_frames() -> u8 {
    2
}
fn default_gop() -> u32 {
    15
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_rate() -> u32 {
    DEFAULT_AUDIO_RATE
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_video_codec(),
            crf: DEFAULT_CRF,
            b_frames: default_b_frames(),
            gop: default_gop(),
            pixel_format: default_pixel_format(),
            audio_codec: default_audio_codec(),
            audio_rate: DEFAULT_AUDIO_RATE,
            audio_bitrate: default_audio_bitrate(),
            extra_args: Vec::new(),
        }
    }
}

impl EncodingConfig {
    /// Create a new encoding configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new config with updated CRF.
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.crf = crf;
        self
    }

    /// Returns a new config with an extra output argument appended.
    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Convert to FFmpeg output arguments.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-bf".to_string(),
            self.b_frames.to_string(),
            "-flags".to_string(),
            "+cgop".to_string(),
            "-g".to_string(),
            self.gop.to_string(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-ar".to_string(),
            self.audio_rate.to_string(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ];

        args.extend(self.extra_args.clone());

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncodingConfig::default();
        assert_eq!(config.codec, "libx264");
        assert_eq!(config.crf, 20);
        assert_eq!(config.audio_rate, 48_000);
    }

    #[test]
    fn test_ffmpeg_args() {
        let args = EncodingConfig::default().to_ffmpeg_args();
        let pairs: Vec<_> = args.windows(2).map(|w| (w[0].as_str(), w[1].as_str())).collect();
        assert!(pairs.contains(&("-c:v", "libx264")));
        assert!(pairs.contains(&("-crf", "20")));
        assert!(pairs.contains(&("-g", "15")));
        assert!(pairs.contains(&("-movflags", "+faststart")));
        assert!(pairs.contains(&("-b:a", "192k")));
    }

    #[test]
    fn test_extra_args_appended_last() {
        let args = EncodingConfig::default()
            .with_crf(23)
            .with_extra_arg("-tune")
            .with_extra_arg("stillimage")
            .to_ffmpeg_args();
        assert!(args.contains(&"23".to_string()));
        assert_eq!(args[args.len() - 2..], ["-tune".to_string(), "stillimage".to_string()]);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: EncodingConfig = serde_json::from_str(r#"{"crf": 18}"#).unwrap();
        assert_eq!(config.crf, 18);
        assert_eq!(config.codec, "libx264");
    }
}
