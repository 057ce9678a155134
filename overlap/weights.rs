// ========================================================================================
//                         Weights table ingestion & indexing
// ========================================================================================
//
// The weights table is the small side of the intersection: it is read exactly
// once, filtered to the target chromosome, and frozen into a read-only index
// before the panel scan starts. Row-level failures are never fatal here; a
// build that drops rows still yields a usable, smaller index.

use crate::files;
use crate::normalize::{normalize_chrom, normalize_pos};
use crate::pipeline::OverlapError;
use crate::types::{CanonicalKey, ScoredVariantRecord};
use ahash::AHashMap;
use csv::ReaderBuilder;
use log::{debug, warn};
use std::collections::hash_map::Entry;
use std::path::Path;

/// Header columns the weights table must provide, in no particular order.
const REQUIRED_COLUMNS: [&str; 5] = ["chr", "pos", "effect_allele", "weight", "id"];

/// The read-only mapping from canonical key to its first-seen scored variant.
///
/// Records are kept in source-row order so that iteration, and therefore
/// downstream example sampling, is deterministic across runs.
#[derive(Debug, Default)]
pub struct WeightsIndex {
    records: Vec<ScoredVariantRecord>,
    by_key: AHashMap<CanonicalKey, usize>,
    skipped_rows: u64,
}

impl WeightsIndex {
    /// Reads the comma-delimited weights table once and builds the index.
    ///
    /// Rows on other chromosomes are dropped silently: the intersection is
    /// always scoped to one chromosome, so this is a pre-filter rather than an
    /// error. Rows with an unparsable position or weight are dropped and
    /// counted. Duplicate keys keep their first occurrence.
    pub fn build(path: &Path, target_chrom: &str) -> Result<Self, OverlapError> {
        let source = files::open_text_source(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| OverlapError::Header {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
            .clone();

        let mut columns = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| OverlapError::Header {
                    path: path.display().to_string(),
                    message: format!("required column '{name}' not found"),
                })?;
        }
        let [chr_col, pos_col, allele_col, weight_col, id_col] = columns;

        let mut index = Self::default();
        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => match e.into_kind() {
                    csv::ErrorKind::Io(io_err) => {
                        return Err(OverlapError::Io {
                            path: path.display().to_string(),
                            source: io_err,
                        });
                    }
                    kind => {
                        index.skipped_rows += 1;
                        debug!("skipping unreadable weights row: {kind:?}");
                        continue;
                    }
                },
            };

            let (Some(raw_chr), Some(raw_pos), Some(raw_allele), Some(raw_weight), Some(raw_id)) = (
                record.get(chr_col),
                record.get(pos_col),
                record.get(allele_col),
                record.get(weight_col),
                record.get(id_col),
            ) else {
                index.skipped_rows += 1;
                continue;
            };

            let chrom = normalize_chrom(raw_chr);
            if chrom != target_chrom {
                continue;
            }

            let pos = match normalize_pos(raw_pos) {
                Ok(pos) => pos,
                Err(e) => {
                    index.skipped_rows += 1;
                    debug!("skipping weights row: {e}");
                    continue;
                }
            };

            let weight: f64 = match raw_weight.trim().parse() {
                Ok(weight) => weight,
                Err(_) => {
                    index.skipped_rows += 1;
                    debug!("skipping weights row: invalid weight '{}'", raw_weight.trim());
                    continue;
                }
            };

            index.insert(ScoredVariantRecord {
                chrom,
                pos,
                effect_allele: raw_allele.trim().to_string(),
                weight,
                id: raw_id.trim().to_string(),
            });
        }

        if index.skipped_rows > 0 {
            warn!(
                "dropped {} unparsable row(s) while indexing {}",
                index.skipped_rows,
                path.display()
            );
        }

        Ok(index)
    }

    fn insert(&mut self, record: ScoredVariantRecord) {
        match self.by_key.entry(record.key()) {
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Number of distinct keys retained: the percentage denominator.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&ScoredVariantRecord> {
        self.by_key.get(key).map(|&idx| &self.records[idx])
    }

    /// Visits records in source-row order.
    pub fn iter(&self) -> impl Iterator<Item = &ScoredVariantRecord> {
        self.records.iter()
    }

    /// Rows dropped during the build because they could not be parsed.
    pub fn skipped_rows(&self) -> u64 {
        self.skipped_rows
    }
}
