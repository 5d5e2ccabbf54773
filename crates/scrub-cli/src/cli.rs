//! Command-line interface for autoscrub
//!
//! Provides argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use scrub_media::scrub::{
    ScrubSettings, DEFAULT_SILENCE_DURATION, DEFAULT_TARGET_LUFS, DEFAULT_TARGET_THRESHOLD_DB,
};
use scrub_media::TrimRange;
use scrub_models::{parse_timestamp, FilterGraphParams, HastenMode, PanMode, Resolution};

/// Speed through the silent parts of lecture recordings
#[derive(Parser, Debug)]
#[command(
    name = "autoscrub",
    version,
    about = "Speed through the silent parts of lecture recordings"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Answer yes to every prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug logs, -vv: trace logs and FFmpeg diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect silences, build the filter graph and render in one go
    Autoprocess {
        /// Recording to scrub
        input: PathBuf,

        /// Where to write the scrubbed recording
        output: PathBuf,

        #[command(flatten)]
        graph: GraphArgs,

        /// Keep the generated filter script next to the output
        #[arg(long)]
        debug: bool,
    },

    /// Write `<stem>.filter-graph` next to the input without rendering
    MakeFiltergraph {
        /// Recording to analyse
        input: PathBuf,

        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Render with the `<stem>.filter-graph` written by make-filtergraph
    ProcessFiltergraph {
        /// Recording the filter graph was made for
        input: PathBuf,

        /// Where to write the scrubbed recording
        output: PathBuf,
    },

    /// Move the integrated loudness to a target without re-timing
    LoudnessAdjust {
        input: PathBuf,

        output: PathBuf,

        /// Integrated loudness to reach, in LUFS
        #[arg(long, value_name = "LUFS", default_value_t = DEFAULT_TARGET_LUFS, allow_hyphen_values = true)]
        target_lufs: f64,
    },

    /// Show duration, sample rate and loudness of a recording
    DisplayVideoProperties {
        input: PathBuf,
    },

    /// List the silences that would be hastened
    IdentifySilences {
        input: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Also write the silences as CSV to this path
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Cut a recording down to a time range
    Trim {
        input: PathBuf,

        /// Defaults to `<stem>_trimmed.<ext>` next to the input
        output: Option<PathBuf>,

        /// Drop everything before this time ([HH:]MM:SS[.fraction] or seconds)
        #[arg(long, value_name = "TIME", value_parser = parse_time)]
        start: Option<f64>,

        /// Drop everything after this time ([HH:]MM:SS[.fraction] or seconds)
        #[arg(long, value_name = "TIME", value_parser = parse_time)]
        stop: Option<f64>,

        /// Re-encode video with this codec instead of copying streams
        #[arg(long, value_name = "CODEC")]
        re_encode: Option<String>,
    },
}

/// Options controlling loudness analysis and silence detection.
#[derive(Args, Debug, Clone)]
pub struct DetectionArgs {
    /// Integrated loudness of the output, in LUFS
    #[arg(long, value_name = "LUFS", default_value_t = DEFAULT_TARGET_LUFS, allow_hyphen_values = true)]
    pub target_lufs: f64,

    /// Silence threshold relative to the target loudness, in dB
    #[arg(long, value_name = "DB", default_value_t = DEFAULT_TARGET_THRESHOLD_DB, allow_hyphen_values = true)]
    pub target_threshold: f64,

    /// Shortest quiet stretch treated as a silence, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_SILENCE_DURATION)]
    pub silence_duration: f64,

    /// Write `<stem>_silences.csv` next to the input
    #[arg(long)]
    pub save_silences: bool,
}

/// Options controlling the synthesized filter graph.
#[derive(Args, Debug, Clone)]
pub struct GraphArgs {
    /// Speedup factor inside silences
    #[arg(long, value_name = "FACTOR", default_value_t = 8.0)]
    pub speed: f64,

    /// Seconds kept at normal speed at each edge of a silence
    #[arg(long, value_name = "SECONDS", default_value_t = 0.25)]
    pub delay: f64,

    /// How sped-up audio is shortened (tempo, pitch, trunc)
    #[arg(long, value_name = "MODE", default_value_t = HastenMode::Tempo)]
    pub hasten_audio: HastenMode,

    /// Copy one stereo channel onto both (left, right)
    #[arg(long, value_name = "CHANNEL")]
    pub pan_audio: Option<PanMode>,

    /// Scale and letterbox the output to this size
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    pub rescale: Option<Vec<u32>>,

    /// Extra gain on top of the loudness correction, in dB
    #[arg(long, value_name = "DB", default_value_t = 0.0, allow_hyphen_values = true)]
    pub gain: f64,

    /// Volume multiplier for the audio of sped-up regions
    #[arg(long, value_name = "MULTIPLIER", default_value_t = 1.0)]
    pub silent_volume: f64,

    #[command(flatten)]
    pub detection: DetectionArgs,
}

impl GraphArgs {
    /// Settings for the analysis and graph build.
    pub fn to_settings(&self) -> ScrubSettings {
        let mut graph = FilterGraphParams::new(self.speed)
            .with_delay(self.delay)
            .with_hasten(self.hasten_audio)
            .with_pan(self.pan_audio.unwrap_or_default())
            .with_silent_volume(self.silent_volume);
        if let Some(resolution) = self.resolution() {
            graph = graph.with_rescale(resolution);
        }

        ScrubSettings {
            graph,
            extra_gain_db: self.gain,
            ..self.detection.to_settings()
        }
    }

    fn resolution(&self) -> Option<Resolution> {
        match self.rescale.as_deref() {
            Some([width, height]) => Some(Resolution::new(*width, *height)),
            _ => None,
        }
    }
}

impl DetectionArgs {
    /// Settings with the graph parameters left at their defaults.
    pub fn to_settings(&self) -> ScrubSettings {
        ScrubSettings {
            target_lufs: self.target_lufs,
            target_threshold_db: self.target_threshold,
            silence_duration: self.silence_duration,
            save_silences: self.save_silences,
            ..Default::default()
        }
    }
}

/// Build the trim range from the parsed flags.
pub fn trim_range(start: Option<f64>, stop: Option<f64>, re_encode: Option<&str>) -> TrimRange {
    let range = TrimRange::new(start, stop);
    match re_encode {
        Some(codec) => range.with_video_codec(codec),
        None => range,
    }
}

/// Parse `[HH:]MM:SS[.fraction]` or plain seconds.
fn parse_time(s: &str) -> Result<f64, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_args(cli: Cli) -> GraphArgs {
        match cli.command {
            Commands::Autoprocess { graph, .. } | Commands::MakeFiltergraph { graph, .. } => graph,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_autoprocess_defaults() {
        let cli = Cli::try_parse_from(["autoscrub", "autoprocess", "in.mp4", "out.mp4"]).unwrap();
        assert!(!cli.yes);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);

        let settings = graph_args(cli).to_settings();
        assert_eq!(settings.graph.factor, 8.0);
        assert_eq!(settings.graph.delay, 0.25);
        assert_eq!(settings.graph.hasten, HastenMode::Tempo);
        assert_eq!(settings.graph.pan, PanMode::None);
        assert_eq!(settings.graph.rescale, None);
        assert_eq!(settings.graph.silent_volume, 1.0);
        assert_eq!(settings.target_lufs, -18.0);
        assert_eq!(settings.target_threshold_db, -18.0);
        assert_eq!(settings.silence_duration, 2.0);
        assert_eq!(settings.extra_gain_db, 0.0);
        assert!(!settings.save_silences);
    }

    #[test]
    fn test_graph_options() {
        let cli = Cli::try_parse_from([
            "autoscrub",
            "make-filtergraph",
            "in.mp4",
            "--speed",
            "4",
            "--hasten-audio",
            "pitch",
            "--pan-audio",
            "right",
            "--rescale",
            "1280",
            "720",
            "--gain",
            "-2.5",
            "--target-lufs",
            "-16",
            "--save-silences",
        ])
        .unwrap();

        let settings = graph_args(cli).to_settings();
        assert_eq!(settings.graph.factor, 4.0);
        assert_eq!(settings.graph.hasten, HastenMode::Pitch);
        assert_eq!(settings.graph.pan, PanMode::Right);
        assert_eq!(settings.graph.rescale, Some(Resolution::new(1280, 720)));
        assert_eq!(settings.extra_gain_db, -2.5);
        assert_eq!(settings.target_lufs, -16.0);
        assert!(settings.save_silences);
    }

    #[test]
    fn test_unknown_hasten_mode_rejected() {
        let result = Cli::try_parse_from([
            "autoscrub",
            "autoprocess",
            "in.mp4",
            "out.mp4",
            "--hasten-audio",
            "warp",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "autoscrub",
            "display-video-properties",
            "in.mp4",
            "-vv",
            "--yes",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.yes);
    }

    #[test]
    fn test_trim_parses_timestamps() {
        let cli = Cli::try_parse_from([
            "autoscrub",
            "trim",
            "in.mp4",
            "--start",
            "01:30",
            "--stop",
            "3723.5",
            "--re-encode",
            "libx264",
        ])
        .unwrap();

        match cli.command {
            Commands::Trim {
                output,
                start,
                stop,
                re_encode,
                ..
            } => {
                assert_eq!(output, None);
                assert_eq!(start, Some(90.0));
                assert_eq!(stop, Some(3723.5));
                let range = trim_range(start, stop, re_encode.as_deref());
                assert_eq!(range.video_codec.as_deref(), Some("libx264"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_trim_rejects_bad_time() {
        let result = Cli::try_parse_from(["autoscrub", "trim", "in.mp4", "--start", "1:2:3:4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_identify_silences_csv() {
        let cli = Cli::try_parse_from([
            "autoscrub",
            "identify-silences",
            "in.mp4",
            "--csv",
            "out.csv",
            "--silence-duration",
            "1.5",
        ])
        .unwrap();

        match cli.command {
            Commands::IdentifySilences { detection, csv, .. } => {
                assert_eq!(csv, Some(PathBuf::from("out.csv")));
                assert_eq!(detection.to_settings().silence_duration, 1.5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
