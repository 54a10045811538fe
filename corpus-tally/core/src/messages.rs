use serde::{Deserialize, Serialize};

/// Messages a worker sends to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkRequest {
    /// Ask for the next line.
    Next { rank: usize },
    /// Acknowledge the done reply; the sender is exiting its loop.
    Complete { rank: usize },
}

/// Dispatcher replies, one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkReply {
    /// One raw corpus line to process.
    Assignment(String),
    /// No further work exists.
    Done,
}
