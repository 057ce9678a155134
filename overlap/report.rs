// ========================================================================================
//                               Report emission
// ========================================================================================

use crate::accumulate::OverlapSummary;
use crate::types::ScoredVariantRecord;
use std::io::{self, Write};

/// Percentage of weights keys matched, defined as zero for an empty index.
///
/// The pipeline refuses to scan against an empty index, so the zero branch is
/// a guard rather than a reachable outcome of a normal run.
pub fn matched_percentage(matched: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64 * 100.0
    }
}

/// The rendered coverage report. Borrows its inputs; mutates nothing.
pub struct OverlapReport<'a> {
    summary: &'a OverlapSummary,
    preview: &'a [ScoredVariantRecord],
    target_chrom: &'a str,
}

impl<'a> OverlapReport<'a> {
    pub fn new(
        summary: &'a OverlapSummary,
        preview: &'a [ScoredVariantRecord],
        target_chrom: &'a str,
    ) -> Self {
        Self {
            summary,
            preview,
            target_chrom,
        }
    }

    pub fn render(&self, out: &mut dyn Write) -> io::Result<()> {
        let summary = self.summary;
        let percentage = matched_percentage(summary.matched_count, summary.total_weights);

        writeln!(out, "Processing complete.")?;
        writeln!(
            out,
            "Total positions in weights file (chr{}): {}",
            self.target_chrom, summary.total_weights
        )?;
        writeln!(out, "Total matched positions: {}", summary.matched_count)?;
        writeln!(
            out,
            "Percentage of matched positions: {percentage:.2}% out of {} total positions in weights file",
            summary.total_weights
        )?;
        writeln!(
            out,
            "Panel rows processed: {} ({} unparsable, {} window(s))",
            summary.processed_rows, summary.skipped_rows, summary.windows
        )?;
        writeln!(out)?;

        if !self.preview.is_empty() {
            writeln!(
                out,
                "First {} parsed variants from weights file:",
                self.preview.len()
            )?;
            for (idx, record) in self.preview.iter().enumerate() {
                writeln!(
                    out,
                    "  Variant {}: Chromosome: {}, Position: {}, Effect Allele: {}, Weight: {}, ID: {}",
                    idx + 1,
                    record.chrom,
                    record.pos,
                    record.effect_allele,
                    record.weight,
                    record.id
                )?;
            }
            writeln!(out)?;
        }

        if summary.matches.is_empty() {
            writeln!(out, "No example matches found.")?;
        } else {
            writeln!(out, "Example Matches:")?;
            for example in &summary.matches {
                let weights = &example.weights;
                let panel = &example.panel;
                writeln!(
                    out,
                    "  Weights File - Chromosome: {}, Position: {}, Effect Allele: {}, Weight: {}, ID: {}",
                    weights.chrom, weights.pos, weights.effect_allele, weights.weight, weights.id
                )?;
                writeln!(
                    out,
                    "  Panel File   - Chromosome: {}, Position: {}, Variant: {}",
                    panel.chrom,
                    panel.pos,
                    panel.composite()
                )?;
                writeln!(out)?;
            }
        }

        if summary.non_matches.is_empty() {
            writeln!(out, "No example non-matches found.")?;
        } else {
            writeln!(out, "Example Non-Matches (from Weights File):")?;
            for record in &summary.non_matches {
                writeln!(
                    out,
                    "  Chromosome: {}, Position: {}, Effect Allele: {}, Weight: {}, ID: {}, Match Status: No Match",
                    record.chrom, record.pos, record.effect_allele, record.weight, record.id
                )?;
            }
        }

        Ok(())
    }
}
