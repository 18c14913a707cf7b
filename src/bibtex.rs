//! Entry source: reads bibliography records from BibTeX files.

pub mod parser;
pub mod record;

use std::fs;
use std::path::Path;

use log::info;

use crate::error::BibDigestError;

pub use parser::parse_bibtex;
pub use record::{RawRecord, RawRecordBuilder};

/// Load every entry of a BibTeX file, in file order.
pub fn load(path: &Path) -> Result<Vec<RawRecord>, BibDigestError> {
    info!("Loading BibTeX file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| BibDigestError::ReadBibliography {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_bibtex(&content)?;
    info!("Loaded {} entries from the BibTeX file", records.len());
    Ok(records)
}
