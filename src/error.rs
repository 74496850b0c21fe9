use std::{io, path::PathBuf};
use thiserror::Error;

/// Failure of a single-file analysis.
///
/// These never abort a batch: the manager turns them into `invalid` rows.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid data in {path:?}: {reason}")]
    DataFormat { path: PathBuf, reason: String },

    #[error("degenerate series: {reason}")]
    DegenerateSeries { reason: String },
}

impl AnalysisError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateSeries {
            reason: reason.into(),
        }
    }
}
