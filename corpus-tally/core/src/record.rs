//! Decoding raw corpus lines into the categorical fields to tally.

use serde::Deserialize;

use crate::error::CorpusError;

/// Categorical fields extracted from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub language: String,
    pub hashtags: Vec<String>,
}

/// Pure decode of a raw line into the values to tally.
pub trait LineProcessor: Clone + Send + 'static {
    fn process(&self, raw: &str) -> Result<RecordFields, CorpusError>;
}

#[derive(Debug, Deserialize)]
struct TweetRow {
    doc: TweetDoc,
}

#[derive(Debug, Deserialize)]
struct TweetDoc {
    lang: String,
    #[serde(default)]
    entities: TweetEntities,
}

#[derive(Debug, Default, Deserialize)]
struct TweetEntities {
    #[serde(default)]
    hashtags: Vec<Hashtag>,
}

#[derive(Debug, Deserialize)]
struct Hashtag {
    text: String,
}

/// Processor for array-style tweet dump rows.
///
/// Extracts `doc.lang` and `doc.entities.hashtags[].text`; hashtags are
/// lowercased so casing variants count as one value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TweetProcessor;

impl TweetProcessor {
    /// Rows of an array-style dump carry a trailing comma; strip it so
    /// the remainder is a standalone JSON object.
    fn normalize(raw: &str) -> &str {
        raw.trim().trim_end_matches(',')
    }
}

impl LineProcessor for TweetProcessor {
    fn process(&self, raw: &str) -> Result<RecordFields, CorpusError> {
        let row: TweetRow = serde_json::from_str(Self::normalize(raw))?;
        let hashtags = row
            .doc
            .entities
            .hashtags
            .into_iter()
            .map(|tag| tag.text.to_lowercase())
            .collect();
        Ok(RecordFields {
            language: row.doc.lang,
            hashtags,
        })
    }
}
