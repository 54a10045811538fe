use std::sync::Arc;

use corpus_tally_core::corpus::LineSource;
use corpus_tally_core::error::CorpusError;
use corpus_tally_core::record::LineProcessor;
use corpus_tally_core::tally::{merge_results, MergedTallies, RankResult};
use tokio::sync::{mpsc, oneshot, Barrier};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::context::WorkerContext;
use crate::dispatcher::DynamicDispatcher;
use crate::pull_worker::PullWorker;
use crate::static_worker::StaticWorker;

/// Coordinates a fixed worker pool over one corpus run.
///
/// Workers share no state; the orchestrator owns the synchronization
/// points of a run: the length broadcast (static model), the
/// end-of-dispatch barrier (dynamic model), and the result gather that
/// precedes merging.
pub struct Orchestrator {
    worker_count: usize,
    cancel_token: CancellationToken,
}

impl Orchestrator {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Returns a clone of the cancellation token for external control.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Static range partitioning: broadcast the resolved length and let
    /// every worker scan its own range of a private source.
    ///
    /// `open_source` builds one source per worker rank.
    pub async fn run_static<S, P, F>(
        &self,
        resolved_length: usize,
        open_source: F,
        processor: P,
    ) -> Result<MergedTallies, CorpusError>
    where
        S: LineSource,
        P: LineProcessor,
        F: Fn(usize) -> Result<S, CorpusError>,
    {
        let worker_count = self.worker_count;
        info!(workers = worker_count, length = resolved_length, "static run started");

        let (result_tx, mut result_rx) = mpsc::channel(worker_count);
        let mut workers = Vec::with_capacity(worker_count);
        let mut length_txs = Vec::with_capacity(worker_count);

        for rank in 0..worker_count {
            let (length_tx, length_rx) = oneshot::channel();
            let mut worker = StaticWorker::new(
                WorkerContext::new(rank, worker_count),
                self.cancel_token.clone(),
            );
            worker.start(
                open_source(rank)?,
                processor.clone(),
                length_rx,
                result_tx.clone(),
            );
            workers.push(worker);
            length_txs.push(length_tx);
        }
        drop(result_tx);

        // Broadcast: every worker receives the same resolved length and
        // derives its range from it.
        for (rank, length_tx) in length_txs.into_iter().enumerate() {
            if length_tx.send(resolved_length).is_err() {
                warn!(rank, "worker dropped before length broadcast");
            }
        }

        let results = gather(&mut result_rx, worker_count).await?;
        for (rank, worker) in workers.into_iter().enumerate() {
            if let Err(err) = worker.wait().await {
                warn!(rank, %err, "worker task failed");
            }
        }

        let merged = self.merge_and_check(results, resolved_length);
        info!(
            processed = merged.processed,
            skipped = merged.skipped,
            "static run finished"
        );
        Ok(merged)
    }

    /// Dynamic on-demand dispatch: the coordinator owns the source and
    /// answers each request with one line until the corpus is exhausted.
    ///
    /// Returns the merged tallies and the number of lines handed out.
    pub async fn run_dynamic<S, P>(
        &self,
        source: S,
        processor: P,
    ) -> Result<(MergedTallies, usize), CorpusError>
    where
        S: LineSource,
        P: LineProcessor,
    {
        let worker_count = self.worker_count;
        info!(workers = worker_count, "dynamic run started");

        let (request_tx, request_rx) = mpsc::channel(worker_count);
        let (result_tx, mut result_rx) = mpsc::channel(worker_count);
        let barrier = Arc::new(Barrier::new(worker_count + 1));

        let mut reply_txs = Vec::with_capacity(worker_count);
        let mut workers = Vec::with_capacity(worker_count);
        for rank in 0..worker_count {
            let (reply_tx, reply_rx) = mpsc::channel(1);
            let mut worker = PullWorker::new(WorkerContext::new(rank, worker_count));
            worker.start(
                processor.clone(),
                request_tx.clone(),
                reply_rx,
                barrier.clone(),
                result_tx.clone(),
            );
            reply_txs.push(reply_tx);
            workers.push(worker);
        }
        drop(request_tx);
        drop(result_tx);

        let dispatcher = DynamicDispatcher::new(source, reply_txs, self.cancel_token.clone());
        let dispatch_result = dispatcher.run(request_rx).await;

        // On a dispatch error the dispatcher (and with it every reply
        // channel) is gone, so workers fall through to the barrier and
        // the pool still unwinds before the error propagates.
        barrier.wait().await;

        let results = gather(&mut result_rx, worker_count).await?;
        for (rank, worker) in workers.into_iter().enumerate() {
            if let Err(err) = worker.wait().await {
                warn!(rank, %err, "worker task failed");
            }
        }
        let dispatched = dispatch_result?;

        let merged = self.merge_and_check(results, dispatched);
        info!(
            processed = merged.processed,
            skipped = merged.skipped,
            dispatched,
            "dynamic run finished"
        );
        Ok((merged, dispatched))
    }

    /// Merge gathered results and check coverage: lines consumed across
    /// the pool must equal the lines the run was responsible for.
    fn merge_and_check(&self, results: Vec<RankResult>, expected: usize) -> MergedTallies {
        let merged = merge_results(results);
        if merged.consumed() != expected && !self.cancel_token.is_cancelled() {
            warn!(
                consumed = merged.consumed(),
                expected, "line coverage mismatch across the pool"
            );
        }
        merged
    }
}

/// Gather: collect exactly one result per worker, ordered by rank.
///
/// The first worker error aborts the gather; a prematurely closed channel
/// yields the results that did arrive.
async fn gather(
    result_rx: &mut mpsc::Receiver<Result<RankResult, CorpusError>>,
    worker_count: usize,
) -> Result<Vec<RankResult>, CorpusError> {
    let mut results = Vec::with_capacity(worker_count);
    while results.len() < worker_count {
        match result_rx.recv().await {
            Some(Ok(result)) => results.push(result),
            Some(Err(err)) => return Err(err),
            None => {
                warn!(
                    gathered = results.len(),
                    expected = worker_count,
                    "result channel closed early"
                );
                break;
            }
        }
    }
    results.sort_by_key(|result| result.rank);
    Ok(results)
}
