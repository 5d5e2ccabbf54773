//! End-to-end scrubbing: analyse a recording, build its filter graph and
//! render it.
//!
//! ```text
//! probe ──► loudness ──► threshold/gain ──► silencedetect ──► FilterGraph
//!                                                                  │
//!                              FilterScript (temp file) ◄──────────┘
//!                                       │
//!                                       ▼
//!                         ffmpeg -filter_complex_script ... -map [v] -map [a]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use scrub_models::{
    gain_to_target, silence_threshold_db, EncodingConfig, FilterGraphParams, LoudnessMetrics,
    SilenceInterval,
};

use crate::analysis::{detect_silences, measure_loudness, silences_csv_path, write_silences_csv};
use crate::command::{FfmpegCommand, FfmpegRunner, Toolchain};
use crate::error::{MediaError, MediaResult};
use crate::graph::{FilterGraph, GraphError, FINAL_AUDIO, FINAL_VIDEO};
use crate::probe::{probe_media, MediaInfo};
use crate::progress::FfmpegProgress;

/// Default loudness target in LUFS.
pub const DEFAULT_TARGET_LUFS: f64 = -18.0;
/// Default silence threshold relative to the loudness target, in dB.
pub const DEFAULT_TARGET_THRESHOLD_DB: f64 = -18.0;
/// Default minimum silence length in seconds.
pub const DEFAULT_SILENCE_DURATION: f64 = 2.0;

/// Extension of saved filter scripts.
pub const FILTER_GRAPH_EXTENSION: &str = "filter-graph";

/// Everything needed to turn a recording into a filter graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrubSettings {
    /// Graph parameters; gain and sample rate are filled in from analysis
    pub graph: FilterGraphParams,
    /// Loudness the output should reach, in LUFS
    pub target_lufs: f64,
    /// Silence threshold relative to `target_lufs`, in dB
    pub target_threshold_db: f64,
    /// Shortest quiet stretch reported as a silence, in seconds
    pub silence_duration: f64,
    /// Gain added on top of the loudness correction, in dB
    pub extra_gain_db: f64,
    /// Write `<stem>_silences.csv` next to the input
    pub save_silences: bool,
}

impl Default for ScrubSettings {
    fn default() -> Self {
        Self {
            graph: FilterGraphParams::default(),
            target_lufs: DEFAULT_TARGET_LUFS,
            target_threshold_db: DEFAULT_TARGET_THRESHOLD_DB,
            silence_duration: DEFAULT_SILENCE_DURATION,
            extra_gain_db: 0.0,
            save_silences: false,
        }
    }
}

impl ScrubSettings {
    /// Reject settings that can never produce a valid graph.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.graph.validate()?;
        self.graph.check_delay_against(self.silence_duration)?;
        Ok(())
    }

    /// Gain in dB for a recording measured at `input_lufs`.
    pub fn gain_for(&self, input_lufs: f64) -> f64 {
        gain_to_target(input_lufs, self.target_lufs, self.graph.pan.is_active())
            + self.extra_gain_db
    }

    /// Silence detection threshold for a recording measured at `input_lufs`.
    pub fn threshold_for(&self, input_lufs: f64) -> f64 {
        silence_threshold_db(input_lufs, self.target_threshold_db, self.target_lufs)
    }
}

/// Analysis results and the graph built from them.
#[derive(Debug, Clone)]
pub struct ScrubPlan {
    pub info: MediaInfo,
    pub loudness: LoudnessMetrics,
    /// Threshold used for silence detection, in dB
    pub threshold_db: f64,
    /// Gain applied to the output, in dB
    pub gain_db: f64,
    /// Silences as detected, before normalization
    pub silences: Vec<SilenceInterval>,
    /// Parameters the graph was built with
    pub params: FilterGraphParams,
    pub graph: FilterGraph,
}

impl ScrubPlan {
    /// Expected output length, when the input length is known.
    pub fn expected_output_duration(&self) -> Option<f64> {
        self.info.duration.map(|d| self.graph.output_duration(d))
    }

    /// Whether no silence will be hastened.
    pub fn is_pass_through(&self) -> bool {
        self.graph.silence_count() == 0
    }
}

/// Analyse `input` and build its filter graph.
pub async fn prepare_filter_graph(
    toolchain: &Toolchain,
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    settings: &ScrubSettings,
) -> MediaResult<ScrubPlan> {
    let input = input.as_ref();
    settings.validate()?;

    let info = probe_media(toolchain, input).await?;
    let sample_rate = match info.sample_rate {
        Some(rate) => rate,
        None => {
            warn!(
                path = %input.display(),
                fallback = settings.graph.sample_rate,
                "No audio sample rate reported, using fallback"
            );
            settings.graph.sample_rate
        }
    };

    let loudness = measure_loudness(runner, input)
        .await?
        .ok_or(MediaError::NotFound("loudness summary"))?;
    let input_lufs = loudness
        .integrated()
        .ok_or(MediaError::NotFound("integrated loudness"))?;

    let gain_db = settings.gain_for(input_lufs);
    let threshold_db = settings.threshold_for(input_lufs);
    info!(input_lufs, gain_db, threshold_db, "Loudness analysed");

    let silences =
        detect_silences(runner, input, threshold_db, settings.silence_duration).await?;

    if settings.save_silences {
        write_silences_csv(silences_csv_path(input), &silences).await?;
    }

    let params = settings
        .graph
        .clone()
        .with_gain_db(gain_db)
        .with_sample_rate(sample_rate);
    let graph = FilterGraph::build(&silences, &params)?;

    Ok(ScrubPlan {
        info,
        loudness,
        threshold_db,
        gain_db,
        silences,
        params,
        graph,
    })
}

/// `<stem>.filter-graph` next to the input.
pub fn filter_graph_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension(FILTER_GRAPH_EXTENSION)
}

/// Write the serialized graph to `path`.
pub async fn write_filter_script(graph: &FilterGraph, path: impl AsRef<Path>) -> MediaResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, graph.to_script()).await?;
    debug!(path = %path.display(), "Wrote filter script");
    Ok(())
}

/// A filter script on disk, removed on drop unless kept.
#[derive(Debug)]
pub struct FilterScript {
    path: PathBuf,
    temp: Option<NamedTempFile>,
}

impl FilterScript {
    /// Write `graph` to a new temporary file in `dir`.
    pub fn temporary(graph: &FilterGraph, dir: impl AsRef<Path>) -> MediaResult<Self> {
        let temp = tempfile::Builder::new()
            .prefix("scrub-")
            .suffix(&format!(".{}", FILTER_GRAPH_EXTENSION))
            .tempfile_in(dir)?;
        std::fs::write(temp.path(), graph.to_script())?;

        Ok(Self {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    /// Refer to an existing script that is never removed.
    pub fn existing(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            temp: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file is removed on drop.
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Keep the file after drop and return its path.
    pub fn keep(mut self) -> MediaResult<PathBuf> {
        if let Some(temp) = self.temp.take() {
            let (_, path) = temp.keep().map_err(|e| MediaError::Io(e.error))?;
            info!(path = %path.display(), "Keeping filter script");
            return Ok(path);
        }
        Ok(self.path.clone())
    }
}

/// A render of `input` to `output` through a filter script.
#[derive(Debug, Clone)]
pub struct RenderJob<'a> {
    pub input: &'a Path,
    pub script: &'a Path,
    pub output: &'a Path,
    pub encoding: &'a EncodingConfig,
    /// FFmpeg `-v` level
    pub log_level: &'a str,
}

impl RenderJob<'_> {
    /// The FFmpeg invocation for this job.
    pub fn command(&self) -> FfmpegCommand {
        FfmpegCommand::new(self.input, self.output)
            .log_level(self.log_level)
            .encoding(self.encoding)
            .filter_complex_script(self.script)
            .map_label(FINAL_VIDEO)
            .map_label(FINAL_AUDIO)
    }
}

/// Execute the filter script with the streamable encoding settings.
pub async fn render_with_script<F>(
    runner: &FfmpegRunner,
    job: &RenderJob<'_>,
    on_progress: F,
) -> MediaResult<()>
where
    F: Fn(FfmpegProgress) + Send + 'static,
{
    if !job.input.exists() {
        return Err(MediaError::FileNotFound(job.input.to_path_buf()));
    }
    if !job.script.exists() {
        return Err(MediaError::FileNotFound(job.script.to_path_buf()));
    }

    info!(
        input = %job.input.display(),
        output = %job.output.display(),
        script = %job.script.display(),
        "Rendering"
    );
    runner.run_with_progress(&job.command(), on_progress).await?;
    info!(output = %job.output.display(), "Render finished");

    Ok(())
}
