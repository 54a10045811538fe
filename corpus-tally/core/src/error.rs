//! Error types for corpus access and record decoding.

use std::path::Path;

use thiserror::Error;

/// Errors surfaced by corpus access, length resolution, and decoding.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// The corpus length could not be determined, so no partition plan
    /// can be computed. Fatal before any worker starts.
    #[error("cannot resolve corpus length for {path}: {source}")]
    Resolution {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A line failed to decode into a record. Handled locally by the
    /// worker holding the line: the line is counted as skipped.
    #[error("malformed record: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reading the corpus failed mid-stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorpusError {
    /// Reclassify an I/O failure as a resolution failure for `path`.
    ///
    /// Used by the length resolver, where any read problem means the
    /// corpus cannot be inspected at all.
    pub fn into_resolution(self, path: &Path) -> CorpusError {
        match self {
            CorpusError::Io(source) => CorpusError::Resolution {
                path: path.display().to_string(),
                source,
            },
            other => other,
        }
    }
}
