use corpus_tally_core::corpus::{Line, LineSource};
use corpus_tally_core::error::CorpusError;
use corpus_tally_core::messages::{WorkReply, WorkRequest};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Dispatch lifecycle: handing out lines, draining requests once the
/// corpus is exhausted, done once every worker has acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchState {
    Dispatching,
    Draining,
    Done,
}

/// Coordinator side of the work-queue model.
///
/// Lines are handed out strictly in corpus order, one per request, none
/// skipped and none duplicated; which worker gets which line depends only
/// on request arrival order. Cancellation moves the dispatcher straight
/// to draining so the pool unwinds cleanly.
pub struct DynamicDispatcher<S> {
    source: S,
    reply_txs: Vec<mpsc::Sender<WorkReply>>,
    cancel_token: CancellationToken,
}

impl<S: LineSource> DynamicDispatcher<S> {
    pub fn new(
        source: S,
        reply_txs: Vec<mpsc::Sender<WorkReply>>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            source,
            reply_txs,
            cancel_token,
        }
    }

    /// Serve requests until every worker has acknowledged the done reply.
    ///
    /// Returns the number of lines handed out.
    pub async fn run(
        mut self,
        mut request_rx: mpsc::Receiver<WorkRequest>,
    ) -> Result<usize, CorpusError> {
        let workers = self.reply_txs.len();
        let mut state = DispatchState::Dispatching;
        let mut dispatched = 0usize;
        let mut acknowledged = 0usize;

        while state != DispatchState::Done {
            let Some(request) = request_rx.recv().await else {
                // Every worker dropped its request sender; no further
                // acknowledgment can arrive.
                warn!(acknowledged, workers, "request channel closed early");
                break;
            };

            match request {
                WorkRequest::Next { rank } => {
                    if rank >= workers {
                        warn!(rank, "request from unknown rank");
                        continue;
                    }
                    let reply = self.next_reply(&mut state, &mut dispatched)?;
                    if self.reply_txs[rank].send(reply).await.is_err() {
                        warn!(rank, "worker reply channel closed");
                    }
                }
                WorkRequest::Complete { rank } => {
                    acknowledged += 1;
                    debug!(rank, acknowledged, workers, "worker completed");
                    if acknowledged == workers {
                        state = DispatchState::Done;
                    }
                }
            }
        }

        debug!(dispatched, "dispatch finished");
        Ok(dispatched)
    }

    fn next_reply(
        &mut self,
        state: &mut DispatchState,
        dispatched: &mut usize,
    ) -> Result<WorkReply, CorpusError> {
        if *state == DispatchState::Dispatching && self.cancel_token.is_cancelled() {
            debug!("cancelled, draining remaining requests");
            *state = DispatchState::Draining;
        }
        if *state == DispatchState::Draining {
            return Ok(WorkReply::Done);
        }
        match self.source.next_line()? {
            Line::Data(raw) => {
                *dispatched += 1;
                Ok(WorkReply::Assignment(raw))
            }
            Line::End => {
                *state = DispatchState::Draining;
                Ok(WorkReply::Done)
            }
        }
    }
}
