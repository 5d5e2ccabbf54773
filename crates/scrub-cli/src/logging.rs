//! Tracing initialisation.
//!
//! Library crates log under `scrub_*` targets and the binary under
//! `autoscrub`; the default directives cover both and `RUST_LOG` can still
//! refine them.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directives for the `scrub` and `autoscrub` targets at the requested verbosity.
pub fn default_directives(verbose: u8, quiet: bool) -> [&'static str; 2] {
    if quiet {
        return ["scrub=warn", "autoscrub=warn"];
    }
    match verbose {
        0 => ["scrub=info", "autoscrub=info"],
        1 => ["scrub=debug", "autoscrub=debug"],
        _ => ["scrub=trace", "autoscrub=trace"],
    }
}

/// Filter with the default directives on top of `RUST_LOG`.
pub fn env_filter(verbose: u8, quiet: bool) -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in default_directives(verbose, quiet) {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// FFmpeg `-v` level matching the requested verbosity.
pub fn ffmpeg_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "fatal"
    } else if verbose >= 2 {
        "info"
    } else {
        "error"
    }
}

/// Install the global subscriber: colored output for terminals, JSON when
/// `json` is set.
pub fn init_tracing(verbose: u8, quiet: bool, json: bool) -> anyhow::Result<()> {
    let env_filter = env_filter(verbose, quiet)?;

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(verbose > 0)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives(0, false), ["scrub=info", "autoscrub=info"]);
        assert_eq!(default_directives(1, false), ["scrub=debug", "autoscrub=debug"]);
        assert_eq!(default_directives(3, false), ["scrub=trace", "autoscrub=trace"]);
        assert_eq!(default_directives(2, true), ["scrub=warn", "autoscrub=warn"]);
    }

    #[test]
    fn test_binary_info_events_enabled() {
        use tracing::subscriber::with_default;
        use tracing::Level;

        let subscriber = tracing_subscriber::registry().with(env_filter(0, false).unwrap());
        with_default(subscriber, || {
            assert!(tracing::enabled!(target: "autoscrub", Level::INFO));
            assert!(tracing::enabled!(target: "scrub_media::scrub", Level::INFO));
            assert!(!tracing::enabled!(target: "autoscrub", Level::DEBUG));
        });

        let subscriber = tracing_subscriber::registry().with(env_filter(0, true).unwrap());
        with_default(subscriber, || {
            assert!(!tracing::enabled!(target: "autoscrub", Level::INFO));
            assert!(tracing::enabled!(target: "autoscrub", Level::WARN));
        });
    }

    #[test]
    fn test_ffmpeg_log_level() {
        assert_eq!(ffmpeg_log_level(0, false), "error");
        assert_eq!(ffmpeg_log_level(2, false), "info");
        assert_eq!(ffmpeg_log_level(2, true), "fatal");
    }
}
