// ========================================================================================
//                            Intersection accumulation
// ========================================================================================
//
// The accumulator folds panel windows into running totals against the frozen
// weights index. State is monotone across the scan: counts only grow, samples
// only fill. A key that surfaces in several windows is counted once, which
// keeps the final totals invariant to how the panel was chunked.

use crate::scan::PanelWindow;
use crate::types::{CanonicalKey, PanelVariantRecord, ScoredVariantRecord};
use crate::weights::WeightsIndex;
use ahash::AHashSet;

/// Placeholder written over nucleotide letters in example output.
const MASK_CHAR: char = 'X';

/// Replaces every nucleotide letter, either case, with [`MASK_CHAR`].
///
/// Example output must not persist raw genotype content; everything else in
/// the allele string (indel notation, missing markers) passes through.
pub fn mask_alleles(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'A' | 'C' | 'G' | 'T' | 'a' | 'c' | 'g' | 't' => MASK_CHAR,
            other => other,
        })
        .collect()
}

/// A captured match: the scored variant paired with the panel row that hit it.
/// Allele fields are masked at capture time.
#[derive(Debug, Clone)]
pub struct MatchedExample {
    pub weights: ScoredVariantRecord,
    pub panel: PanelVariantRecord,
}

impl MatchedExample {
    fn capture(weights: &ScoredVariantRecord, panel: &PanelVariantRecord) -> Self {
        let mut weights = weights.clone();
        weights.effect_allele = mask_alleles(&weights.effect_allele);

        let mut panel = panel.clone();
        panel.allele1 = mask_alleles(&panel.allele1);
        panel.allele2 = mask_alleles(&panel.allele2);

        Self { weights, panel }
    }
}

/// Final, immutable result of one full scan.
#[derive(Debug)]
pub struct OverlapSummary {
    pub matched_count: u64,
    pub total_weights: u64,
    pub processed_rows: u64,
    pub skipped_rows: u64,
    pub windows: u64,
    pub matches: Vec<MatchedExample>,
    /// Weights variants never observed in the panel, first-N in index order,
    /// with the effect allele masked.
    pub non_matches: Vec<ScoredVariantRecord>,
}

/// Streaming accumulator for counts and bounded example capture.
#[derive(Debug)]
pub struct Accumulator {
    example_limit: usize,
    matched: AHashSet<CanonicalKey>,
    processed_rows: u64,
    skipped_rows: u64,
    windows: u64,
    matches: Vec<MatchedExample>,
}

impl Accumulator {
    pub fn new(example_limit: usize) -> Self {
        Self {
            example_limit,
            matched: AHashSet::new(),
            processed_rows: 0,
            skipped_rows: 0,
            windows: 0,
            matches: Vec::new(),
        }
    }

    /// Folds one window into the running totals.
    ///
    /// Match examples fill in first-encountered order and are fixed once
    /// capacity is reached; later matches never evict earlier ones.
    pub fn absorb(&mut self, window: &PanelWindow, index: &WeightsIndex) {
        self.windows += 1;
        self.processed_rows += window.rows;
        self.skipped_rows += window.skipped;

        for (key, panel_record) in &window.records {
            if !index.contains(key) {
                continue;
            }
            if !self.matched.insert(key.clone()) {
                continue;
            }
            if self.matches.len() < self.example_limit
                && let Some(weights_record) = index.get(key)
            {
                self.matches
                    .push(MatchedExample::capture(weights_record, panel_record));
            }
        }
    }

    /// Seals the run once the panel source is exhausted.
    ///
    /// Every index key never observed in any window becomes a non-match
    /// candidate, capacity-bounded in index iteration order.
    pub fn finalize(self, index: &WeightsIndex) -> OverlapSummary {
        let mut non_matches = Vec::new();
        for record in index.iter() {
            if non_matches.len() == self.example_limit {
                break;
            }
            if self.matched.contains(&record.key()) {
                continue;
            }
            let mut record = record.clone();
            record.effect_allele = mask_alleles(&record.effect_allele);
            non_matches.push(record);
        }

        OverlapSummary {
            matched_count: self.matched.len() as u64,
            total_weights: index.len() as u64,
            processed_rows: self.processed_rows,
            skipped_rows: self.skipped_rows,
            windows: self.windows,
            matches: self.matches,
            non_matches,
        }
    }
}
