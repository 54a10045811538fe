use std::sync::Arc;

use corpus_tally_core::error::CorpusError;
use corpus_tally_core::messages::{WorkReply, WorkRequest};
use corpus_tally_core::record::LineProcessor;
use corpus_tally_core::tally::RankResult;
use tokio::sync::{mpsc, Barrier};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::context::WorkerContext;

/// Worker side of the work-queue model.
///
/// Loops request/receive until the done reply, acknowledges it, then
/// reports its result at the gather point. A closed reply channel is
/// treated like the done reply so a failing dispatcher unwinds the pool
/// instead of hanging it.
pub struct PullWorker {
    ctx: WorkerContext,
    task_handle: Option<JoinHandle<()>>,
}

impl PullWorker {
    pub fn new(ctx: WorkerContext) -> Self {
        Self {
            ctx,
            task_handle: None,
        }
    }

    /// Spawns the worker task.
    pub fn start<P: LineProcessor>(
        &mut self,
        processor: P,
        request_tx: mpsc::Sender<WorkRequest>,
        mut reply_rx: mpsc::Receiver<WorkReply>,
        barrier: Arc<Barrier>,
        result_tx: mpsc::Sender<Result<RankResult, CorpusError>>,
    ) {
        let ctx = self.ctx;

        let handle = tokio::spawn(async move {
            let mut result = RankResult::new(ctx.rank);

            loop {
                if request_tx
                    .send(WorkRequest::Next { rank: ctx.rank })
                    .await
                    .is_err()
                {
                    warn!(rank = ctx.rank, "dispatcher gone before done reply");
                    break;
                }
                match reply_rx.recv().await {
                    Some(WorkReply::Assignment(raw)) => match processor.process(&raw) {
                        Ok(fields) => result.absorb(fields),
                        Err(err) => {
                            debug!(rank = ctx.rank, %err, "skipping malformed line");
                            result.skipped += 1;
                        }
                    },
                    Some(WorkReply::Done) | None => {
                        let _ = request_tx
                            .send(WorkRequest::Complete { rank: ctx.rank })
                            .await;
                        break;
                    }
                }
            }

            debug!(
                rank = ctx.rank,
                processed = result.processed,
                skipped = result.skipped,
                "worker finished"
            );

            // No tally mutation past this point; the coordinator gathers
            // only after the whole pool has arrived.
            barrier.wait().await;

            if result_tx.send(Ok(result)).await.is_err() {
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
