//! Subcommand handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tokio::sync::watch;
use tracing::{debug, info};

use scrub_media::{
    detect_silences, filter_graph_path, match_loudness, measure_loudness, prepare_filter_graph,
    probe_media, render_with_script, silences_csv_path, trim_media, trimmed_path,
    write_filter_script, write_silences_csv, FfmpegRunner, FilterScript, MediaError, RenderJob,
    ScrubPlan, ScrubSettings, Toolchain,
};
use scrub_models::{format_clock, EncodingConfig};

use crate::cli::{trim_range, Cli, Commands, DetectionArgs, GraphArgs};
use crate::config::ToolConfig;
use crate::error::CliError;
use crate::logging::ffmpeg_log_level;
use crate::prompt::Prompter;
use crate::report::{properties, silence_table, RenderProgress};

/// Everything a handler needs besides its own arguments.
pub struct Context {
    pub toolchain: Toolchain,
    pub config: ToolConfig,
    pub prompter: Prompter,
    pub cancel: watch::Receiver<bool>,
    pub quiet: bool,
}

impl Context {
    pub fn new(cli: &Cli, config: ToolConfig, cancel: watch::Receiver<bool>) -> Result<Self> {
        let toolchain = config
            .toolchain(ffmpeg_log_level(cli.verbose, cli.quiet))
            .context("FFmpeg and FFprobe must be installed (or set SCRUB_FFMPEG / SCRUB_FFPROBE)")?;

        Ok(Self {
            toolchain,
            config,
            prompter: Prompter::new(cli.yes),
            cancel,
            quiet: cli.quiet,
        })
    }

    /// Runner for rendering passes.
    fn runner(&self) -> FfmpegRunner {
        self.toolchain.runner().with_cancel(self.cancel.clone())
    }

    /// Runner for analysis passes.
    fn analysis_runner(&self) -> FfmpegRunner {
        self.toolchain
            .analysis_runner()
            .with_cancel(self.cancel.clone())
    }

    /// Ask before replacing an existing file.
    fn confirm_overwrite(&self, path: &Path) -> Result<()> {
        if path.exists() {
            self.prompter
                .require(&format!("{} already exists. Overwrite?", path.display()))?;
        }
        Ok(())
    }
}

/// Run the selected subcommand.
pub async fn run(cli: Cli, ctx: &Context) -> Result<()> {
    match cli.command {
        Commands::Autoprocess {
            input,
            output,
            graph,
            debug,
        } => autoprocess(ctx, &input, &output, &graph, debug).await,
        Commands::MakeFiltergraph { input, graph } => make_filtergraph(ctx, &input, &graph).await,
        Commands::ProcessFiltergraph { input, output } => {
            process_filtergraph(ctx, &input, &output).await
        }
        Commands::LoudnessAdjust {
            input,
            output,
            target_lufs,
        } => loudness_adjust(ctx, &input, &output, target_lufs).await,
        Commands::DisplayVideoProperties { input } => display_video_properties(ctx, &input).await,
        Commands::IdentifySilences {
            input,
            detection,
            csv,
        } => identify_silences(ctx, &input, &detection, csv).await,
        Commands::Trim {
            input,
            output,
            start,
            stop,
            re_encode,
        } => {
            let output = output.unwrap_or_else(|| trimmed_path(&input));
            let range = trim_range(start, stop, re_encode.as_deref());
            check_distinct(&input, &output)?;
            ctx.confirm_overwrite(&output)?;
            trim_media(&ctx.runner(), &input, &output, &range)
                .await
                .with_context(|| format!("Failed to trim {}", input.display()))?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}

async fn autoprocess(
    ctx: &Context,
    input: &Path,
    output: &Path,
    args: &GraphArgs,
    debug: bool,
) -> Result<()> {
    let settings = args.to_settings();
    settings.validate()?;
    check_distinct(input, output)?;
    ctx.confirm_overwrite(output)?;

    let plan = analyse(ctx, input, &settings).await?;
    confirm_pass_through(ctx, &plan)?;

    let script_dir = parent_dir(output);
    let script = FilterScript::temporary(&plan.graph, &script_dir)
        .with_context(|| format!("Failed to write filter script in {}", script_dir.display()))?;
    debug!(path = %script.path().display(), "Filter script ready");

    let result = render(ctx, input, script.path(), output, plan.expected_output_duration()).await;

    if debug || ctx.config.keep_script {
        let kept = script.keep()?;
        println!("Filter script kept at {}", kept.display());
    }
    result?;

    print_plan_summary(&plan);
    println!("Wrote {}", output.display());
    Ok(())
}

async fn make_filtergraph(ctx: &Context, input: &Path, args: &GraphArgs) -> Result<()> {
    let plan = analyse(ctx, input, &args.to_settings()).await?;
    confirm_pass_through(ctx, &plan)?;

    let path = filter_graph_path(input);
    ctx.confirm_overwrite(&path)?;
    write_filter_script(&plan.graph, &path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    print_plan_summary(&plan);
    println!("Wrote {}", path.display());
    Ok(())
}

async fn process_filtergraph(ctx: &Context, input: &Path, output: &Path) -> Result<()> {
    let path = filter_graph_path(input);
    if !path.exists() {
        return Err(CliError::MissingFilterGraph(path).into());
    }
    let script = FilterScript::existing(&path)?;
    check_distinct(input, output)?;
    ctx.confirm_overwrite(output)?;

    render(ctx, input, script.path(), output, None).await?;
    println!("Wrote {}", output.display());
    Ok(())
}

async fn loudness_adjust(ctx: &Context, input: &Path, output: &Path, target_lufs: f64) -> Result<()> {
    check_distinct(input, output)?;
    ctx.confirm_overwrite(output)?;

    let gain_db = match_loudness(&ctx.runner(), input, output, target_lufs)
        .await
        .with_context(|| format!("Failed to adjust loudness of {}", input.display()))?;

    println!("Applied {:+.1} dB", gain_db);
    println!("Wrote {}", output.display());
    Ok(())
}

async fn display_video_properties(ctx: &Context, input: &Path) -> Result<()> {
    let info = probe_media(&ctx.toolchain, input)
        .await
        .with_context(|| format!("Failed to probe {}", input.display()))?;
    let loudness = measure_loudness(&ctx.analysis_runner(), input)
        .await
        .with_context(|| format!("Failed to measure loudness of {}", input.display()))?;

    print!("{}", properties(&info, loudness.as_ref()));
    Ok(())
}

async fn identify_silences(
    ctx: &Context,
    input: &Path,
    args: &DetectionArgs,
    csv: Option<PathBuf>,
) -> Result<()> {
    let settings = args.to_settings();
    let runner = ctx.analysis_runner();

    let input_lufs = measure_loudness(&runner, input)
        .await
        .with_context(|| format!("Failed to measure loudness of {}", input.display()))?
        .and_then(|metrics| metrics.integrated())
        .ok_or(MediaError::NotFound("integrated loudness"))?;
    let threshold_db = settings.threshold_for(input_lufs);
    info!(input_lufs, threshold_db, "Detecting silences");

    let silences = detect_silences(&runner, input, threshold_db, settings.silence_duration)
        .await
        .with_context(|| format!("Failed to detect silences in {}", input.display()))?;

    let csv = csv.or_else(|| settings.save_silences.then(|| silences_csv_path(input)));
    if let Some(path) = csv {
        write_silences_csv(&path, &silences)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    print!("{}", silence_table(&silences));
    Ok(())
}

async fn analyse(ctx: &Context, input: &Path, settings: &ScrubSettings) -> Result<ScrubPlan> {
    prepare_filter_graph(&ctx.toolchain, &ctx.analysis_runner(), input, settings)
        .await
        .with_context(|| format!("Failed to analyse {}", input.display()))
}

async fn render(
    ctx: &Context,
    input: &Path,
    script: &Path,
    output: &Path,
    expected_secs: Option<f64>,
) -> Result<()> {
    let encoding = EncodingConfig::default();
    let job = RenderJob {
        input,
        script,
        output,
        encoding: &encoding,
        log_level: &ctx.toolchain.log_level,
    };

    let progress = RenderProgress::new(expected_secs, ctx.quiet);
    let result = render_with_script(&ctx.runner(), &job, progress.callback()).await;
    progress.finish();

    result.with_context(|| format!("Failed to render {}", output.display()))
}

/// Zero silences would re-encode the whole file for nothing.
fn confirm_pass_through(ctx: &Context, plan: &ScrubPlan) -> Result<()> {
    if plan.is_pass_through() {
        ctx.prompter
            .require("No silences found. Continue with an unchanged timeline?")?;
    }
    Ok(())
}

fn print_plan_summary(plan: &ScrubPlan) {
    println!(
        "Hastening {} silences, saving {}",
        plan.graph.silence_count(),
        format_clock(plan.graph.time_saved())
    );
    if let (Some(before), Some(after)) = (plan.info.duration, plan.expected_output_duration()) {
        println!("Duration {} -> {}", format_clock(before), format_clock(after));
    }
}

fn check_distinct(input: &Path, output: &Path) -> Result<(), CliError> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => input == output,
    };
    if same {
        Err(CliError::SameFile(output.to_path_buf()))
    } else {
        Ok(())
    }
}

/// Directory for scratch files next to `path`.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
