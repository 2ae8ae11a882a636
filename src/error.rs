// Error kinds for the analysis core.
//
// Per-record problems (Input) are isolated by the analyzer and reported as
// skipped records. Oracle and configuration problems are checked before any
// record is processed and abort the run.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, TopicanError>;

/// Errors surfaced by the topic analyser.
#[derive(Debug, Error)]
pub enum TopicanError {
    /// A record could not be turned into observations (non-text value,
    /// tagger failure). The record is skipped; the batch continues.
    #[error("record {index} skipped: {reason}")]
    Input { index: usize, reason: String },

    /// A taxonomic or similarity backend is not loaded or is empty.
    #[error("{oracle} oracle unavailable: {reason}")]
    OracleUnavailable {
        oracle: &'static str,
        reason: String,
    },

    /// Invalid analysis settings.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A resource file (lexicon, taxonomy, vectors, seeds) could not be read.
    #[error("failed to load {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TopicanError {
    /// Whether this error only affects one record.
    pub fn is_per_record(&self) -> bool {
        matches!(self, TopicanError::Input { .. })
    }

    pub(crate) fn oracle(oracle: &'static str, reason: impl Into<String>) -> Self {
        TopicanError::OracleUnavailable {
            oracle,
            reason: reason.into(),
        }
    }

    pub(crate) fn resource(path: &Path, source: std::io::Error) -> Self {
        TopicanError::Resource {
            path: path.to_path_buf(),
            source,
        }
    }

    /// A resource file that was readable but malformed.
    pub(crate) fn invalid_data(path: &Path, reason: impl ToString) -> Self {
        Self::resource(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, reason.to_string()),
        )
    }
}
