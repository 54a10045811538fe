//! Domain model for partitioned tallying of line-oriented JSON corpora.
//!
//! A corpus is a header line, any number of JSON data lines, and a final
//! sentinel line. Workers split the data lines between themselves (by
//! contiguous range or by on-demand dispatch), extract categorical fields
//! per record, and the per-worker tallies merge into one global ranking.
//! This crate holds everything transport-independent: corpus access,
//! record decoding, range arithmetic, tallies, and the dispatch message
//! types. The task-channels crate provides the tokio transport.

pub mod corpus;
pub mod error;
pub mod messages;
pub mod partition;
pub mod presenter;
pub mod record;
pub mod resolver;
pub mod tally;
