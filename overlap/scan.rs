// ========================================================================================
//                             Streaming panel scanner
// ========================================================================================
//
// The panel is the large side of the intersection and is never held whole in
// memory. The scanner pulls bounded windows of rows, collapses each window to
// its set of canonical keys, and hands the window downstream before reading
// the next one. Peak memory is one window plus the reader's buffer, no matter
// how long the panel file is.

use crate::files;
use crate::normalize::{COMPOSITE_DELIMITER, NormalizeError, normalize_chrom, normalize_pos, split_composite};
use crate::pipeline::OverlapError;
use crate::types::{CanonicalKey, PanelVariantRecord};
use ahash::AHashMap;
use log::debug;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use sysinfo::System;
use thiserror::Error;

/// 0-based column of the composite `chrom:pos:allele1:allele2` token.
const VARIANT_TOKEN_COLUMN: usize = 1;
/// 0-based columns of the two allele strings.
const ALLELE1_COLUMN: usize = 4;
const ALLELE2_COLUMN: usize = 5;

/// Estimated in-memory footprint of one buffered panel row.
const ESTIMATED_ROW_BYTES: u64 = 96;
/// Window sizing floor; below this the per-window overhead dominates.
const MIN_WINDOW_ROWS: usize = 1_024;
/// Window sizing ceiling; above this the memory bound stops being meaningful.
const MAX_WINDOW_ROWS: usize = 4_194_304;

/// Derives the per-window row budget from currently available system memory.
///
/// Queried exactly once per run, before the scan starts, so the window size
/// cannot drift mid-run. This is a performance knob, not a correctness
/// requirement: any window size yields identical totals.
pub fn window_rows_from_memory(memory_fraction: f64) -> usize {
    let mut sys = System::new();
    sys.refresh_memory();

    let budget_bytes = (sys.available_memory() as f64 * memory_fraction) as u64;
    let rows = (budget_bytes / ESTIMATED_ROW_BYTES) as usize;
    rows.clamp(MIN_WINDOW_ROWS, MAX_WINDOW_ROWS)
}

/// One bounded slice of panel rows, collapsed to first-seen records per key.
///
/// Duplicate keys within a window collapse intentionally: window-level
/// presence, not multiplicity, drives the intersection.
#[derive(Debug, Default)]
pub struct PanelWindow {
    pub records: AHashMap<CanonicalKey, PanelVariantRecord>,
    /// Rows consumed for this window, well-formed and skipped alike.
    pub rows: u64,
    /// Rows dropped because they could not be parsed.
    pub skipped: u64,
}

#[derive(Debug, Error)]
enum PanelRowError {
    #[error("fewer than {min} whitespace-delimited columns", min = ALLELE2_COLUMN + 1)]
    TooFewColumns,
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Pull-based reader over the panel file. A fresh scanner always starts at the
/// beginning of the source; a scan is not restartable mid-run.
pub struct PanelScanner {
    reader: Box<dyn BufRead + Send>,
    path: PathBuf,
    window_rows: usize,
    line: String,
    done: bool,
}

impl PanelScanner {
    pub fn open(path: &Path, window_rows: usize) -> Result<Self, OverlapError> {
        Ok(Self {
            reader: files::open_text_source(path)?,
            path: path.to_path_buf(),
            window_rows: window_rows.max(1),
            line: String::new(),
            done: false,
        })
    }

    /// Pulls the next window of rows. `Ok(None)` signals source exhaustion.
    ///
    /// A malformed row is counted and skipped, never aborting the window; an
    /// unreadable source is fatal.
    pub fn next_window(&mut self) -> Result<Option<PanelWindow>, OverlapError> {
        if self.done {
            return Ok(None);
        }

        let mut window = PanelWindow::default();
        while (window.rows as usize) < self.window_rows {
            self.line.clear();
            let bytes_read =
                self.reader
                    .read_line(&mut self.line)
                    .map_err(|e| OverlapError::Io {
                        path: self.path.display().to_string(),
                        source: e,
                    })?;

            if bytes_read == 0 {
                self.done = true;
                break;
            }
            if self.line.trim().is_empty() {
                continue;
            }

            window.rows += 1;
            match parse_panel_row(&self.line) {
                Ok(record) => {
                    window.records.entry(record.key()).or_insert(record);
                }
                Err(reason) => {
                    window.skipped += 1;
                    debug!("skipping panel row: {reason}");
                }
            }
        }

        if window.rows == 0 && self.done {
            Ok(None)
        } else {
            Ok(Some(window))
        }
    }
}

/// Parses one panel row into a record keyed by the composite variant token.
///
/// The token is authoritative for chromosome and position; the raw chromosome
/// column (column 0) is deliberately ignored even when the two disagree.
fn parse_panel_row(line: &str) -> Result<PanelVariantRecord, PanelRowError> {
    let mut fields = line.split_whitespace();

    let token = fields
        .nth(VARIANT_TOKEN_COLUMN)
        .ok_or(PanelRowError::TooFewColumns)?;
    // Columns 2 and 3 carry map distance and a redundant position; not retained.
    let allele1 = fields
        .nth(ALLELE1_COLUMN - VARIANT_TOKEN_COLUMN - 1)
        .ok_or(PanelRowError::TooFewColumns)?;
    let allele2 = fields.next().ok_or(PanelRowError::TooFewColumns)?;

    let parts = split_composite(token, COMPOSITE_DELIMITER)?;
    let chrom = normalize_chrom(parts.chrom);
    let pos = normalize_pos(parts.pos)?;

    Ok(PanelVariantRecord {
        chrom,
        pos,
        allele1: allele1.to_string(),
        allele2: allele2.to_string(),
    })
}
