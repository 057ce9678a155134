// ========================================================================================
//                            Identifier normalization
// ========================================================================================
//
// Both input tables spell the same variant differently: the weights table may
// prefix chromosomes with "chr" and pad positions, the panel embeds everything
// in a delimited token. Every key that crosses the match boundary passes
// through this module first, so the intersection itself only ever sees one
// representation.

use thiserror::Error;

/// Delimiter between the fields of a composite variant token.
pub const COMPOSITE_DELIMITER: char = ':';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid position '{0}': expected a non-negative integer")]
    MalformedPosition(String),
    #[error("malformed variant token '{0}': expected at least 'chrom:pos'")]
    MalformedVariantToken(String),
}

/// Strips surrounding whitespace and a single leading case-insensitive `chr` token.
pub fn normalize_chrom(raw: &str) -> String {
    let mut trimmed = raw.trim();

    if trimmed.len() >= 3 && trimmed[..3].eq_ignore_ascii_case("chr") {
        trimmed = &trimmed[3..];
    }

    trimmed.to_string()
}

/// Strictly parses a position token after trimming whitespace.
///
/// The stricter of the two historical contracts: non-numeric positions are
/// rejected rather than carried through as opaque strings.
pub fn normalize_pos(raw: &str) -> Result<u64, NormalizeError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u64>()
        .map_err(|_| NormalizeError::MalformedPosition(trimmed.to_string()))
}

/// The raw fields of a composite variant token, borrowed from the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeParts<'a> {
    pub chrom: &'a str,
    pub pos: &'a str,
    pub allele1: &'a str,
    pub allele2: &'a str,
}

/// Splits a `chrom:pos:allele1:allele2` token into its fields.
///
/// The chromosome and position fields are mandatory; the allele fields are
/// optional and come back as empty strings when absent.
pub fn split_composite(token: &str, delimiter: char) -> Result<CompositeParts<'_>, NormalizeError> {
    let mut fields = token.splitn(4, delimiter);
    let chrom = fields.next().unwrap_or("");
    let pos = match fields.next() {
        Some(pos) => pos,
        None => return Err(NormalizeError::MalformedVariantToken(token.to_string())),
    };

    Ok(CompositeParts {
        chrom,
        pos,
        allele1: fields.next().unwrap_or(""),
        allele2: fields.next().unwrap_or(""),
    })
}
