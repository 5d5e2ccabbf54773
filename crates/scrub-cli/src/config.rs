//! Tool configuration.

use std::path::PathBuf;

use scrub_media::{MediaResult, Toolchain};

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolConfig {
    /// FFmpeg binary override
    pub ffmpeg: Option<PathBuf>,
    /// FFprobe binary override
    pub ffprobe: Option<PathBuf>,
    /// Upper bound for a single rendering pass
    pub timeout_secs: Option<u64>,
    /// Keep the filter script after autoprocess
    pub keep_script: bool,
    /// Emit logs as JSON
    pub json_logs: bool,
}

impl ToolConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            ffmpeg: lookup("SCRUB_FFMPEG")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            ffprobe: lookup("SCRUB_FFPROBE")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            timeout_secs: lookup("SCRUB_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0),
            keep_script: lookup("SCRUB_KEEP_SCRIPT")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            json_logs: lookup("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
        }
    }

    /// Resolve the binaries and apply the render timeout and FFmpeg log level.
    pub fn toolchain(&self, ffmpeg_log_level: &str) -> MediaResult<Toolchain> {
        Ok(Toolchain::locate(self.ffmpeg.clone(), self.ffprobe.clone())?
            .with_log_level(ffmpeg_log_level)
            .with_timeout(self.timeout_secs))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ToolConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ToolConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]), ToolConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SCRUB_FFMPEG", "/opt/ffmpeg/bin/ffmpeg"),
            ("SCRUB_TIMEOUT_SECS", "7200"),
            ("SCRUB_KEEP_SCRIPT", "yes"),
            ("LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(config.ffmpeg, Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(config.ffprobe, None);
        assert_eq!(config.timeout_secs, Some(7200));
        assert!(config.keep_script);
        assert!(config.json_logs);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let config = config_from(&[
            ("SCRUB_FFPROBE", ""),
            ("SCRUB_TIMEOUT_SECS", "soon"),
            ("SCRUB_KEEP_SCRIPT", "0"),
        ]);
        assert_eq!(config.ffprobe, None);
        assert_eq!(config.timeout_secs, None);
        assert!(!config.keep_script);

        assert_eq!(config_from(&[("SCRUB_TIMEOUT_SECS", "0")]).timeout_secs, None);
    }
}
