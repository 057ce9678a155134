// ========================================================================================
//                       Run orchestration & error taxonomy
// ========================================================================================
//
// The pipeline is strictly sequential: the weights index is complete before
// the first panel window is read, windows are consumed in production order,
// and the accumulator is the only mutable state. Fatal conditions abort with
// a single clear message; no partial report is ever written after one.

use crate::accumulate::{Accumulator, OverlapSummary};
use crate::report::OverlapReport;
use crate::scan::PanelScanner;
use crate::types::RunConfig;
use crate::weights::WeightsIndex;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlapError {
    #[error("input file {path} does not exist or is not a regular file")]
    MissingInput { path: String },
    #[error("I/O error for file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid weights header in {path}: {message}")]
    Header { path: String, message: String },
    #[error(
        "no weights variants remained for chromosome {chrom} in {path}; nothing to intersect"
    )]
    EmptyWeightsSet { path: String, chrom: String },
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

fn ensure_input_exists(path: &Path) -> Result<(), OverlapError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(OverlapError::MissingInput {
            path: path.display().to_string(),
        })
    }
}

fn create_progress_spinner(message: &str) -> ProgressBar {
    let draw_target = if io::stderr().is_terminal() {
        ProgressDrawTarget::stderr_with_hz(20)
    } else {
        ProgressDrawTarget::hidden()
    };

    let pb = ProgressBar::with_draw_target(None, draw_target);
    pb.set_style(
        ProgressStyle::with_template("\n> [{elapsed_precise}] {human_pos} rows {msg}").unwrap(),
    );
    pb.set_message(message.to_string());

    pb
}

/// Executes one full run: validate inputs, build the index, stream the panel,
/// render the report to `out`. Returns the summary for programmatic callers.
pub fn run(config: &RunConfig, out: &mut dyn Write) -> Result<OverlapSummary, OverlapError> {
    let overall_start = Instant::now();

    ensure_input_exists(&config.weights_path)?;
    ensure_input_exists(&config.panel_path)?;

    eprintln!("> Stage 1: Indexing weights variants...");
    let index = WeightsIndex::build(&config.weights_path, &config.target_chrom)?;
    info!(
        "weights index holds {} distinct key(s) for chromosome {} ({} row(s) dropped)",
        index.len(),
        config.target_chrom,
        index.skipped_rows()
    );
    if index.is_empty() {
        return Err(OverlapError::EmptyWeightsSet {
            path: config.weights_path.display().to_string(),
            chrom: config.target_chrom.clone(),
        });
    }

    eprintln!(
        "> Stage 2: Streaming panel windows ({} rows per window)...",
        config.window_rows
    );
    let mut scanner = PanelScanner::open(&config.panel_path, config.window_rows)?;
    let mut accumulator = Accumulator::new(config.example_limit);
    let progress = create_progress_spinner("panel rows scanned");
    while let Some(window) = scanner.next_window()? {
        accumulator.absorb(&window, &index);
        progress.inc(window.rows);
    }
    progress.finish_and_clear();

    eprintln!("> Stage 3: Finalizing report...");
    let preview: Vec<_> = index.iter().take(config.example_limit).cloned().collect();
    let summary = accumulator.finalize(&index);
    let report = OverlapReport::new(&summary, &preview, &config.target_chrom);
    report.render(out)?;

    info!(
        "matched {} of {} weights key(s) across {} panel row(s) in {:.2?}",
        summary.matched_count,
        summary.total_weights,
        summary.processed_rows,
        overall_start.elapsed()
    );

    Ok(summary)
}
