//! Coordinator-side discovery of the corpus length.

use std::path::Path;

use crate::corpus::{FileLineSource, Line, LineSource};
use crate::error::CorpusError;

/// Count the data lines of the corpus at `path`.
///
/// Runs on the coordinator only; workers receive the value through the
/// length broadcast and never re-derive it, so every participant computes
/// the same partition plan. Counting streams the same source abstraction
/// workers read through, so resolver and workers agree on what a data
/// line is.
pub fn resolve_corpus_length(path: impl AsRef<Path>) -> Result<usize, CorpusError> {
    let path = path.as_ref();
    let source = FileLineSource::open(path).map_err(|err| err.into_resolution(path))?;
    count_data_lines(source).map_err(|err| err.into_resolution(path))
}

/// Drain `source`, counting data lines up to the end marker.
pub fn count_data_lines<S: LineSource>(mut source: S) -> Result<usize, CorpusError> {
    let mut length = 0;
    while let Line::Data(_) = source.next_line()? {
        length += 1;
    }
    Ok(length)
}
