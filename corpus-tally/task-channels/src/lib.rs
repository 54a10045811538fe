//! Tokio-task transport for the corpus tally pipeline.
//!
//! A run launches a fixed pool of worker tasks that coordinate purely by
//! message passing: the orchestrator broadcasts the resolved corpus
//! length (static model) or answers one request with one line (dynamic
//! model), then gathers exactly one result per worker and merges them.

pub mod context;
pub mod dispatcher;
pub mod orchestrator;
pub mod pull_worker;
pub mod sequential;
pub mod static_worker;
