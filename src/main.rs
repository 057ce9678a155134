// ========================================================================================
//
//                         THE RUN ORCHESTRATOR: CONCORD
//
// ========================================================================================
//
// This binary owns the application lifecycle: argument parsing, logger setup,
// window-budget resolution, and exit-status mapping. The actual engine lives
// in the library; everything here is configuration and plumbing.

use clap::Parser;
use concord::normalize;
use concord::pipeline;
use concord::scan;
use concord::types::RunConfig;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

// ========================================================================================
//                         COMMAND-LINE INTERFACE DEFINITION
// ========================================================================================

#[derive(Parser, Debug)]
#[clap(
    name = "concord",
    version,
    about = "A streaming engine for measuring variant overlap between scored-variant tables and genotyping panels."
)]
struct Args {
    /// Path to the comma-delimited weights table (columns: chr,pos,effect_allele,weight,id).
    weights: PathBuf,

    /// Path to the whitespace-delimited genotype panel (PLINK .bim layout).
    panel: PathBuf,

    /// Chromosome the intersection is scoped to.
    #[clap(long, default_value = "22")]
    chrom: String,

    /// Maximum number of match / non-match examples captured for the report.
    #[clap(long, default_value_t = 5)]
    examples: usize,

    /// Fraction of available memory granted to one panel window.
    #[clap(long, default_value_t = 0.1)]
    memory_fraction: f64,

    /// Fixed rows per panel window, bypassing the memory heuristic.
    #[clap(long)]
    window_rows: Option<usize>,
}

// ========================================================================================
//                           THE MAIN ORCHESTRATION LOGIC
// ========================================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_module_path(false)
        .init();

    let args = Args::parse();

    // The window budget is resolved exactly once, before any file is opened.
    let window_rows = args
        .window_rows
        .unwrap_or_else(|| scan::window_rows_from_memory(args.memory_fraction));

    let config = RunConfig {
        weights_path: args.weights,
        panel_path: args.panel,
        target_chrom: normalize::normalize_chrom(&args.chrom),
        example_limit: args.examples,
        window_rows,
    };

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if let Err(e) = pipeline::run(&config, &mut out) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    if let Err(e) = out.flush() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
