use std::io::Write;

use corpus_tally_core::corpus::{FileLineSource, MemoryLineSource, SENTINEL};
use corpus_tally_core::record::TweetProcessor;
use corpus_tally_core::resolver::resolve_corpus_length;
use corpus_tally_core::tally::MergedTallies;
use corpus_tally_task_channels::orchestrator::Orchestrator;
use corpus_tally_task_channels::sequential::run_sequential;
use tempfile::NamedTempFile;

fn tweet(id: usize, lang: &str, tags: &[&str]) -> String {
    let tags: Vec<String> = tags
        .iter()
        .map(|tag| format!("{{\"text\":\"{tag}\"}}"))
        .collect();
    format!(
        "{{\"id\":\"{id}\",\"doc\":{{\"lang\":\"{lang}\",\"entities\":{{\"hashtags\":[{}]}}}}}},",
        tags.join(",")
    )
}

fn sample_corpus() -> Vec<String> {
    let rows: Vec<(&str, Vec<&str>)> = vec![
        ("en", vec!["news", "sport"]),
        ("fr", vec!["news"]),
        ("en", vec![]),
        ("es", vec!["travel"]),
        ("en", vec!["news"]),
        ("fr", vec![]),
        ("ja", vec!["food", "travel"]),
        ("en", vec!["sport"]),
        ("es", vec![]),
        ("en", vec!["news"]),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(id, (lang, tags))| tweet(id, lang, &tags))
        .collect()
}

fn assert_same_tallies(left: &MergedTallies, right: &MergedTallies) {
    assert_eq!(left.processed, right.processed);
    assert_eq!(left.skipped, right.skipped);
    assert_eq!(left.languages, right.languages);
    assert_eq!(left.hashtags, right.hashtags);
    assert_eq!(left.languages.top(10), right.languages.top(10));
    assert_eq!(left.hashtags.top(10), right.hashtags.top(10));
}

// ============================================================
// cross-mode equivalence
// ============================================================

#[tokio::test]
async fn test_static_matches_sequential_baseline() {
    let lines = sample_corpus();
    let source = MemoryLineSource::new(lines.clone());

    let baseline = run_sequential(source.clone(), &TweetProcessor).expect("sequential run");
    let parallel = Orchestrator::new(3)
        .run_static(lines.len(), |_rank| Ok(source.clone()), TweetProcessor)
        .await
        .expect("static run");

    assert_same_tallies(&baseline, &parallel);
}

#[tokio::test]
async fn test_dynamic_matches_sequential_baseline() {
    let lines = sample_corpus();
    let source = MemoryLineSource::new(lines);

    let baseline = run_sequential(source.clone(), &TweetProcessor).expect("sequential run");
    let (parallel, dispatched) = Orchestrator::new(4)
        .run_dynamic(source, TweetProcessor)
        .await
        .expect("dynamic run");

    assert_same_tallies(&baseline, &parallel);
    assert_eq!(dispatched, baseline.processed);
}

#[tokio::test]
async fn test_single_worker_pool_matches_sequential_baseline() {
    let lines = sample_corpus();
    let source = MemoryLineSource::new(lines.clone());

    let baseline = run_sequential(source.clone(), &TweetProcessor).expect("sequential run");
    let static_run = Orchestrator::new(1)
        .run_static(lines.len(), |_rank| Ok(source.clone()), TweetProcessor)
        .await
        .expect("static run");
    let (dynamic_run, _) = Orchestrator::new(1)
        .run_dynamic(source, TweetProcessor)
        .await
        .expect("dynamic run");

    assert_same_tallies(&baseline, &static_run);
    assert_same_tallies(&baseline, &dynamic_run);
}

// ============================================================
// coverage invariants
// ============================================================

#[tokio::test]
async fn test_static_consumes_every_line_exactly_once() {
    // One unique language per line: any skip or double-count shows up as
    // a count other than 1.
    let lines: Vec<String> = (0..10).map(|id| tweet(id, &format!("l{id}"), &[])).collect();
    let source = MemoryLineSource::new(lines.clone());

    let merged = Orchestrator::new(3)
        .run_static(lines.len(), |_rank| Ok(source.clone()), TweetProcessor)
        .await
        .expect("static run");

    assert_eq!(merged.processed, 10);
    assert_eq!(merged.skipped, 0);
    assert_eq!(merged.languages.len(), 10);
    for id in 0..10 {
        assert_eq!(merged.languages.count(&format!("l{id}")), 1);
    }
}

#[tokio::test]
async fn test_dynamic_dispatches_every_line_exactly_once() {
    let lines: Vec<String> = (0..25).map(|id| tweet(id, &format!("l{id}"), &[])).collect();
    let source = MemoryLineSource::new(lines.clone());

    let (merged, dispatched) = Orchestrator::new(4)
        .run_dynamic(source, TweetProcessor)
        .await
        .expect("dynamic run");

    assert_eq!(dispatched, lines.len());
    assert_eq!(merged.processed, lines.len());
    assert_eq!(merged.languages.len(), lines.len());
    for id in 0..lines.len() {
        assert_eq!(merged.languages.count(&format!("l{id}")), 1);
    }
}

#[tokio::test]
async fn test_pool_larger_than_corpus_still_covers_it() {
    let lines: Vec<String> = (0..3).map(|id| tweet(id, "en", &[])).collect();
    let source = MemoryLineSource::new(lines.clone());

    let static_run = Orchestrator::new(8)
        .run_static(lines.len(), |_rank| Ok(source.clone()), TweetProcessor)
        .await
        .expect("static run");
    let (dynamic_run, dispatched) = Orchestrator::new(8)
        .run_dynamic(source, TweetProcessor)
        .await
        .expect("dynamic run");

    assert_eq!(static_run.processed, 3);
    assert_eq!(dynamic_run.processed, 3);
    assert_eq!(dispatched, 3);
    assert_eq!(static_run.languages.count("en"), 3);
    assert_eq!(dynamic_run.languages.count("en"), 3);
}

#[tokio::test]
async fn test_empty_corpus_produces_empty_tallies() {
    let source = MemoryLineSource::new(Vec::new());

    let static_run = Orchestrator::new(3)
        .run_static(0, |_rank| Ok(source.clone()), TweetProcessor)
        .await
        .expect("static run");
    let (dynamic_run, dispatched) = Orchestrator::new(3)
        .run_dynamic(source, TweetProcessor)
        .await
        .expect("dynamic run");

    assert_eq!(static_run.processed, 0);
    assert!(static_run.languages.is_empty());
    assert_eq!(dispatched, 0);
    assert_eq!(dynamic_run.processed, 0);
    assert!(dynamic_run.hashtags.is_empty());
}

// ============================================================
// malformed input
// ============================================================

#[tokio::test]
async fn test_malformed_lines_are_skipped_in_both_models() {
    let mut lines = sample_corpus();
    lines.insert(2, "definitely not json".to_string());
    lines.push("{\"doc\":".to_string());
    let source = MemoryLineSource::new(lines.clone());

    let static_run = Orchestrator::new(3)
        .run_static(lines.len(), |_rank| Ok(source.clone()), TweetProcessor)
        .await
        .expect("static run");
    let (dynamic_run, dispatched) = Orchestrator::new(3)
        .run_dynamic(source, TweetProcessor)
        .await
        .expect("dynamic run");

    assert_eq!(static_run.processed, 10);
    assert_eq!(static_run.skipped, 2);
    assert_eq!(static_run.consumed(), lines.len());
    assert_eq!(dispatched, lines.len());
    assert_same_tallies(&static_run, &dynamic_run);
}

// ============================================================
// file-backed end to end
// ============================================================

#[tokio::test]
async fn test_file_backed_run_matches_memory_run() {
    let lines = sample_corpus();
    let mut file = NamedTempFile::new().expect("create temp corpus");
    writeln!(file, "{{\"total_rows\":{},\"rows\":[", lines.len()).expect("write header");
    for line in &lines {
        writeln!(file, "{line}").expect("write data line");
    }
    writeln!(file, "{SENTINEL}").expect("write sentinel");

    let length = resolve_corpus_length(file.path()).expect("resolve length");
    assert_eq!(length, lines.len());

    let path = file.path().to_path_buf();
    let from_file = Orchestrator::new(3)
        .run_static(length, |_rank| FileLineSource::open(&path), TweetProcessor)
        .await
        .expect("file-backed static run");
    let from_memory = run_sequential(MemoryLineSource::new(lines), &TweetProcessor)
        .expect("sequential run");

    assert_same_tallies(&from_file, &from_memory);
}
