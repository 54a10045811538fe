use std::ops::Range;
use std::time::Instant;

use corpus_tally_core::corpus::{Line, LineSource};
use corpus_tally_core::error::CorpusError;
use corpus_tally_core::partition::range_for;
use corpus_tally_core::record::LineProcessor;
use corpus_tally_core::tally::RankResult;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::context::WorkerContext;

/// Worker that owns a contiguous range of the corpus.
///
/// The range is computed locally from the broadcast length, so every
/// worker derives the same partition plan without further coordination.
/// Each worker reads through its own source, fast-forwarding past the
/// prefix below its start.
pub struct StaticWorker {
    ctx: WorkerContext,
    cancel_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl StaticWorker {
    pub fn new(ctx: WorkerContext, cancel_token: CancellationToken) -> Self {
        Self {
            ctx,
            cancel_token,
            task_handle: None,
        }
    }

    /// Spawns the worker task.
    ///
    /// `length_rx` delivers the broadcast corpus length; the finished
    /// `RankResult` is reported on `result_tx` at the gather point.
    pub fn start<S, P>(
        &mut self,
        source: S,
        processor: P,
        length_rx: oneshot::Receiver<usize>,
        result_tx: mpsc::Sender<Result<RankResult, CorpusError>>,
    ) where
        S: LineSource,
        P: LineProcessor,
    {
        let ctx = self.ctx;
        let cancel_token = self.cancel_token.clone();

        let handle = tokio::spawn(async move {
            let Ok(length) = length_rx.await else {
                warn!(rank = ctx.rank, "length broadcast dropped before delivery");
                return;
            };

            let range = range_for(length, ctx.size, ctx.rank);
            debug!(
                rank = ctx.rank,
                start = range.start,
                end = range.end,
                "range assigned"
            );

            let started = Instant::now();
            let reply = scan_range(ctx, source, &processor, range, &cancel_token);
            match &reply {
                Ok(result) => debug!(
                    rank = ctx.rank,
                    processed = result.processed,
                    skipped = result.skipped,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "worker finished"
                ),
                Err(err) => warn!(rank = ctx.rank, %err, "worker failed"),
            }

            if result_tx.send(reply).await.is_err() {
                warn!(rank = ctx.rank, "result channel closed before gather");
            }
        });

        self.task_handle = Some(handle);
    }

    /// Waits for the worker task to complete.
    pub async fn wait(self) -> Result<(), tokio::task::JoinError> {
        if let Some(handle) = self.task_handle {
            handle.await
        } else {
            Ok(())
        }
    }
}

/// Consume `[range.start, range.end)` from `source` into a fresh result.
///
/// Malformed lines are counted as skipped, never fatal. Stops early on
/// the end marker or when the cancel token fires.
fn scan_range<S, P>(
    ctx: WorkerContext,
    mut source: S,
    processor: &P,
    range: Range<usize>,
    cancel_token: &CancellationToken,
) -> Result<RankResult, CorpusError>
where
    S: LineSource,
    P: LineProcessor,
{
    let mut result = RankResult::new(ctx.rank);
    source.skip(range.start)?;

    for index in range {
        if cancel_token.is_cancelled() {
            debug!(rank = ctx.rank, "cancelled");
            break;
        }
        match source.next_line()? {
            Line::End => break,
            Line::Data(raw) => match processor.process(&raw) {
                Ok(fields) => result.absorb(fields),
                Err(err) => {
                    debug!(rank = ctx.rank, line = index, %err, "skipping malformed line");
                    result.skipped += 1;
                }
            },
        }
    }

    Ok(result)
}
