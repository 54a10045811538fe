mod generate;
mod present;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use corpus_tally_core::corpus::FileLineSource;
use corpus_tally_core::presenter::ResultPresenter;
use corpus_tally_core::record::TweetProcessor;
use corpus_tally_core::resolver::resolve_corpus_length;
use corpus_tally_core::tally::MergedTallies;
use corpus_tally_task_channels::orchestrator::Orchestrator;
use corpus_tally_task_channels::sequential::run_sequential;
use tracing::{debug, info};

use crate::present::ConsolePresenter;

/// Rank the most frequent tweet languages and hashtags in a corpus
#[derive(Parser)]
#[command(name = "twitter-trends")]
#[command(about = "Partitioned language/hashtag ranking over line-oriented tweet dumps", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tally a corpus and print the top-ranked values
    Run {
        /// Corpus file to tally
        corpus: PathBuf,

        /// Number of processing workers
        #[arg(short, long, default_value_t = 4)]
        workers: usize,

        /// Scheduling mode
        #[arg(short, long, value_enum, default_value = "static")]
        mode: Mode,

        /// How many top entries to print per category
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },
    /// Write a synthetic tweet corpus for demos and timing
    Gen {
        /// Output file
        out: PathBuf,

        /// Number of data lines to generate
        #[arg(short, long, default_value_t = 5000)]
        lines: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Contiguous range per worker, computed from the corpus length
    Static,
    /// One line per request from the coordinator, balanced by arrival
    Dynamic,
    /// Single task, no coordination; the reference pipeline
    Sequential,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            corpus,
            workers,
            mode,
            top,
        } => run(corpus, workers, mode, top).await,
        Commands::Gen { out, lines } => generate::write_corpus(&out, lines),
    }
}

async fn run(corpus: PathBuf, workers: usize, mode: Mode, top: usize) -> anyhow::Result<()> {
    anyhow::ensure!(workers >= 1, "at least one worker is required");
    let processor = TweetProcessor;
    let started = Instant::now();

    // A single worker gains nothing from the partition machinery.
    let mode = if workers == 1 && mode != Mode::Sequential {
        info!("single worker requested, running the sequential pipeline");
        Mode::Sequential
    } else {
        mode
    };

    let merged = match mode {
        Mode::Sequential => {
            let source = FileLineSource::open(&corpus)?;
            run_sequential(source, &processor)?
        }
        Mode::Static => {
            let length = resolve_corpus_length(&corpus)?;
            let orchestrator = Orchestrator::new(workers);
            install_ctrl_c(&orchestrator);
            orchestrator
                .run_static(length, |_rank| FileLineSource::open(&corpus), processor)
                .await?
        }
        Mode::Dynamic => {
            let source = FileLineSource::open(&corpus)?;
            let orchestrator = Orchestrator::new(workers);
            install_ctrl_c(&orchestrator);
            let (merged, dispatched) = orchestrator.run_dynamic(source, processor).await?;
            debug!(dispatched, "lines handed out");
            merged
        }
    };

    report(&merged, top);
    info!(
        elapsed_s = started.elapsed().as_secs_f64(),
        "run complete"
    );
    Ok(())
}

/// Cancel the run's token on Ctrl-C so workers unwind cleanly.
fn install_ctrl_c(orchestrator: &Orchestrator) {
    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, cancelling the run");
            token.cancel();
        }
    });
}

fn report(merged: &MergedTallies, top: usize) {
    let presenter = ConsolePresenter;
    presenter.present(&merged.languages.top(top), "LANGUAGE");
    presenter.present(&merged.hashtags.top(top), "HASHTAGS");
    println!(
        "\n{} lines processed, {} skipped",
        merged.processed, merged.skipped
    );
}
