// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// This file is ONLY for types that are SHARED BETWEEN FILES, not types that only are used
// in one file.

use std::fmt;
use std::path::PathBuf;

/// The normalized (chromosome, position) pair used as the sole matching criterion.
///
/// The chromosome carries no case-insensitive `chr` prefix and no surrounding
/// whitespace. The position is held as an integer, so two keys compare equal
/// exactly when their minimal decimal renderings would: `"0022"` and `"22"`
/// collapse during normalization, never at the match boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub chrom: String,
    pub pos: u64,
}

impl CanonicalKey {
    pub fn new(chrom: impl Into<String>, pos: u64) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
        }
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)
    }
}

/// One retained row of the scored-variant ("weights") table.
///
/// Immutable once the index is built. When degenerate source data maps several
/// rows onto one key, the first occurrence is the record that represents the key.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredVariantRecord {
    pub chrom: String,
    pub pos: u64,
    pub effect_allele: String,
    pub weight: f64,
    pub id: String,
}

impl ScoredVariantRecord {
    #[inline]
    pub fn key(&self) -> CanonicalKey {
        CanonicalKey::new(self.chrom.clone(), self.pos)
    }
}

/// One well-formed row of the genotype panel.
///
/// Chromosome and position derive from the composite variant token, which is
/// authoritative over the panel's raw chromosome column. Only the token-derived
/// key and the two allele columns are retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelVariantRecord {
    pub chrom: String,
    pub pos: u64,
    pub allele1: String,
    pub allele2: String,
}

impl PanelVariantRecord {
    #[inline]
    pub fn key(&self) -> CanonicalKey {
        CanonicalKey::new(self.chrom.clone(), self.pos)
    }

    /// Reassembles the composite variant token from the retained fields.
    pub fn composite(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.chrom, self.pos, self.allele1, self.allele2
        )
    }
}

/// The fully-resolved configuration for one run.
///
/// `window_rows` is fixed before the run starts, either from the memory
/// heuristic or from an explicit override, and never changes mid-scan.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub weights_path: PathBuf,
    pub panel_path: PathBuf,
    pub target_chrom: String,
    pub example_limit: usize,
    pub window_rows: usize,
}
