//! Synthetic corpus generation for demos and timing runs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use corpus_tally_core::corpus::SENTINEL;
use rand::Rng;
use tracing::info;

/// Language pool with rough frequency weights.
const LANGUAGES: &[(&str, u32)] = &[
    ("en", 55),
    ("es", 12),
    ("pt", 8),
    ("ja", 7),
    ("fr", 5),
    ("id", 4),
    ("de", 3),
    ("it", 2),
    ("ko", 2),
    ("nl", 1),
    ("und", 1),
];

const HASHTAGS: &[&str] = &[
    "melbourne",
    "auspol",
    "news",
    "travel",
    "food",
    "music",
    "sport",
    "weather",
    "art",
    "coffee",
    "photography",
    "fitness",
];

/// Write a corpus in the array-dump shape: header row, one tweet object
/// per line with a trailing comma, then the sentinel line.
pub fn write_corpus(path: &Path, lines: usize) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut rng = rand::rng();

    writeln!(out, "{{\"total_rows\":{lines},\"offset\":0,\"rows\":[")?;
    for id in 0..lines {
        let lang = pick_language(&mut rng);
        let tags: Vec<String> = pick_hashtags(&mut rng)
            .into_iter()
            .map(|tag| format!("{{\"text\":\"{tag}\"}}"))
            .collect();
        writeln!(
            out,
            "{{\"id\":\"{id}\",\"doc\":{{\"lang\":\"{lang}\",\"entities\":{{\"hashtags\":[{}]}}}}}},",
            tags.join(",")
        )?;
    }
    writeln!(out, "{SENTINEL}")?;
    out.flush()?;

    info!(lines, path = %path.display(), "synthetic corpus written");
    Ok(())
}

fn pick_language(rng: &mut impl Rng) -> &'static str {
    let total: u32 = LANGUAGES.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.random_range(0..total);
    for &(lang, weight) in LANGUAGES {
        if roll < weight {
            return lang;
        }
        roll -= weight;
    }
    LANGUAGES[0].0
}

fn pick_hashtags(rng: &mut impl Rng) -> Vec<&'static str> {
    let count = rng.random_range(0..=3);
    (0..count)
        .map(|_| HASHTAGS[rng.random_range(0..HASHTAGS.len())])
        .collect()
}
