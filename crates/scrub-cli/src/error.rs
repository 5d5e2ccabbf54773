//! CLI error types.

use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Aborted: {0}")]
    Declined(String),

    #[error("Filter graph {0} not found; run make-filtergraph first")]
    MissingFilterGraph(std::path::PathBuf),

    #[error("Input and output are the same file: {0}")]
    SameFile(std::path::PathBuf),

    #[error("Media error: {0}")]
    Media(#[from] scrub_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether the user chose to stop, as opposed to a failure.
    pub fn is_declined(&self) -> bool {
        matches!(self, CliError::Declined(_))
    }
}
