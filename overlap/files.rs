// ========================================================================================
//                               Text input plumbing
// ========================================================================================

use crate::pipeline::OverlapError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Opens a local text source, transparently decompressing gzip input.
pub fn open_text_source(path: &Path) -> Result<Box<dyn BufRead + Send>, OverlapError> {
    let file = File::open(path).map_err(|e| OverlapError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let reader: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    Ok(Box::new(BufReader::new(reader)))
}
