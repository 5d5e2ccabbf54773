//! Timestamp parsing and formatting utilities.
//!
//! FFmpeg reports times as `[hh:]mm:ss[.fraction]` and the filter graph
//! expects plain seconds with a fixed number of decimals. Both directions
//! live here so every crate formats time the same way.

/// Number of decimals used for every timestamp written into a filter graph.
pub const FIXED_DECIMALS: usize = 4;

/// Largest change a value may see when round-tripped through [`format_fixed`].
pub const FIXED_TOLERANCE: f64 = 5e-5;

/// Parse a `[hh:]mm:ss[.fraction]` string to total seconds.
///
/// Components are accumulated positionally in base 60, so `SS`, `MM:SS`
/// and `HH:MM:SS` all work and only the last component may be fractional
/// in practice.
///
/// # Examples
/// ```
/// use scrub_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:02:03.500").unwrap(), 3723.5);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    let mut total = 0.0;
    for part in parts {
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

/// Format seconds with the fixed filter-graph precision (`12.3400`).
pub fn format_fixed(seconds: f64) -> String {
    format!("{:.*}", FIXED_DECIMALS, seconds)
}

/// Format seconds as `HH:MM:SS.mmm`, keeping a leading `-` for negative input.
pub fn format_clock(total_secs: f64) -> String {
    // Round once, so carries reach the minute and hour fields
    let total_ms = (total_secs.abs() * 1000.0).round() as u64;
    let sign = if total_secs < 0.0 && total_ms > 0 { "-" } else { "" };

    let hours = total_ms / 3_600_000;
    let mins = (total_ms / 60_000) % 60;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;

    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, mins, secs, millis)
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Timestamp contains negative values
    Negative,
    /// Invalid numeric value for a component
    InvalidValue(String),
    /// More than three `:`-separated components
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::Negative => write!(f, "Timestamp cannot be negative"),
            Self::InvalidValue(value) => write!(f, "Invalid timestamp component: {}", value),
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use [HH:]MM:SS[.fraction] or seconds",
                ts
            ),
        }
    }
}

impl std::error::Error for TimestampError {}
