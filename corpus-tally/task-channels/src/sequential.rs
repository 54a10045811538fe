use std::time::Instant;

use corpus_tally_core::corpus::{Line, LineSource};
use corpus_tally_core::error::CorpusError;
use corpus_tally_core::record::LineProcessor;
use corpus_tally_core::tally::{merge_results, MergedTallies, RankResult};
use tracing::{debug, info};

/// Single-task reference pipeline: read, decode, accumulate. No
/// partitioning, no messaging.
///
/// Validates that parallel runs over the same corpus produce identical
/// merged tallies, and serves as the timing baseline. The driver routes
/// single-worker runs here, where the partition machinery would be pure
/// overhead.
pub fn run_sequential<S, P>(mut source: S, processor: &P) -> Result<MergedTallies, CorpusError>
where
    S: LineSource,
    P: LineProcessor,
{
    let started = Instant::now();
    let mut result = RankResult::new(0);

    loop {
        match source.next_line()? {
            Line::End => break,
            Line::Data(raw) => match processor.process(&raw) {
                Ok(fields) => result.absorb(fields),
                Err(err) => {
                    debug!(%err, "skipping malformed line");
                    result.skipped += 1;
                }
            },
        }
    }

    info!(
        processed = result.processed,
        skipped = result.skipped,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "sequential pass finished"
    );
    Ok(merge_results([result]))
}
