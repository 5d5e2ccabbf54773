//! Cleanup of the raw silence list before partitioning.

use tracing::debug;

use scrub_models::SilenceInterval;

/// Drop the boundary artifacts of a detected silence list.
///
/// 1. A trailing silence without an end (file ended while silent) is dropped;
///    it stays at normal speed.
/// 2. Then a leading silence starting at or before 0 is dropped.
///
/// The result may be empty. The function is pure: applying it to the same
/// input always yields the same output.
pub fn normalize_silences(silences: &[SilenceInterval]) -> Vec<SilenceInterval> {
    let mut normalized = silences;

    if let Some((last, rest)) = normalized.split_last() {
        if !last.is_closed() {
            debug!(start = last.start, "Dropping trailing open silence");
            normalized = rest;
        }
    }

    if let Some((first, rest)) = normalized.split_first() {
        if first.start <= 0.0 {
            debug!(start = first.start, "Dropping leading silence at file start");
            normalized = rest;
        }
    }

    normalized.to_vec()
}
