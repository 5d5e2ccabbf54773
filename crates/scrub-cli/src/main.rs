//! autoscrub binary.

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use scrub_cli::logging::init_tracing;
use scrub_cli::{commands, Cli, CliError, Context, ToolConfig};
use scrub_media::MediaError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = ToolConfig::from_env();

    if let Err(e) = init_tracing(cli.verbose, cli.quiet, config.json_logs) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    // Ctrl-C kills the running FFmpeg child through the runners
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, stopping FFmpeg");
            cancel_tx.send(true).ok();
        }
    });

    let ctx = match Context::new(&cli, config, cancel_rx) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match commands::run(cli, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => exit_code_for(&e),
    }
}

fn exit_code_for(e: &anyhow::Error) -> ExitCode {
    if let Some(cli_error) = e.downcast_ref::<CliError>() {
        if cli_error.is_declined() {
            eprintln!("{}", cli_error);
            return ExitCode::FAILURE;
        }
    }
    let cancelled = e
        .chain()
        .filter_map(|cause| cause.downcast_ref::<MediaError>())
        .any(MediaError::is_cancelled);
    if cancelled {
        eprintln!("Cancelled");
        return ExitCode::from(130);
    }

    error!("{:#}", e);
    ExitCode::FAILURE
}
